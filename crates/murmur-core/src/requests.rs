//! Abstract transport contract consumed by the tracker.
//!
//! The tracker never talks to the wire itself: it builds a request
//! descriptor, hands it to the [`RequestService`], and applies the result
//! when the returned future resolves. Exactly one terminal outcome is
//! observed per issued future; cancellation happens by dropping the task
//! that is awaiting it.

use futures::future::BoxFuture;

use crate::models::{AuthorId, ConversationId, MsgId};

/// Descriptor for one paginated unread-items fetch.
///
/// `offset_id`, `add_offset` and `limit` follow the remote pagination
/// contract: the page is the window of `limit` items ending at
/// `offset_id + add_offset`. `max_id`/`min_id` are fixed at `MsgId(0)`
/// ("no bound") at every call site in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnreadPageRequest {
    pub conversation: ConversationId,
    pub topic_root: Option<MsgId>,
    pub offset_id: MsgId,
    pub add_offset: i32,
    pub limit: i32,
    pub max_id: MsgId,
    pub min_id: MsgId,
}

/// One unread item in a fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnreadMessage {
    pub id: MsgId,
    pub author: AuthorId,
}

/// Result payload of an unread-items fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnreadPage {
    /// The server had nothing newer than what we already hold; no list
    /// payload at all.
    NotModified,
    Slice {
        /// Authoritative total for the whole unread set, when the server
        /// includes one with the page.
        full_count: Option<i32>,
        messages: Vec<UnreadMessage>,
    },
}

impl UnreadPage {
    pub fn slice(full_count: Option<i32>, messages: Vec<UnreadMessage>) -> Self {
        Self::Slice {
            full_count,
            messages,
        }
    }
}

/// One reaction event on a message, as returned by the reaction-details
/// fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionEvent {
    pub reactor: AuthorId,
    pub unread: bool,
}

/// Per-message reaction details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReactions {
    pub message: MsgId,
    pub reactions: Vec<ReactionEvent>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Remote operations the tracker depends on.
///
/// Implementations construct and send the actual wire request; each method
/// returns a future resolving to the single terminal outcome. Futures must
/// be safe to drop before completion (that is how the tracker cancels).
pub trait RequestService: Send + Sync {
    /// Fetch a page of unread mentions for a conversation or topic.
    fn unread_mentions_slice(
        &self,
        request: UnreadPageRequest,
    ) -> BoxFuture<'static, Result<UnreadPage, RequestError>>;

    /// Fetch a page of unread reactions for a conversation or topic.
    fn unread_reactions_slice(
        &self,
        request: UnreadPageRequest,
    ) -> BoxFuture<'static, Result<UnreadPage, RequestError>>;

    /// Fetch per-message reaction details (reactor identity plus unread
    /// flag) for the given messages.
    fn message_reactions(
        &self,
        conversation: ConversationId,
        messages: Vec<MsgId>,
    ) -> BoxFuture<'static, Result<Vec<MessageReactions>, RequestError>>;

    /// Mark message contents (mentions, reactions, media) read on the
    /// server. Generic variant for non-channel-backed peers.
    fn read_contents(
        &self,
        messages: Vec<MsgId>,
    ) -> BoxFuture<'static, Result<(), RequestError>>;

    /// Channel-scoped variant of [`RequestService::read_contents`].
    fn read_channel_contents(
        &self,
        channel: ConversationId,
        messages: Vec<MsgId>,
    ) -> BoxFuture<'static, Result<(), RequestError>>;
}
