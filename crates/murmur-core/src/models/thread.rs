use parking_lot::{Mutex, MutexGuard};

use super::conversation::{Conversation, ConversationId};
use super::counter::{MsgId, UnreadCounter};

/// The two secondary signals tracked independently per thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Mentions,
    Reactions,
}

/// Identity of a tracked thread: the conversation plus, for forum-style
/// conversations, the root message of the topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadKey {
    pub conversation: ConversationId,
    pub topic_root: Option<MsgId>,
}

/// A conversation, or a topic within one — the unit of unread tracking.
///
/// Owns one `UnreadCounter` per signal kind. The tracker mutates the
/// counters from request-completion tasks, so they sit behind a mutex;
/// everything else on the thread is immutable after construction.
pub struct Thread {
    conversation: Conversation,
    topic_root: Option<MsgId>,
    mentions: Mutex<UnreadCounter>,
    reactions: Mutex<UnreadCounter>,
}

impl Thread {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            conversation,
            topic_root: None,
            mentions: Mutex::new(UnreadCounter::default()),
            reactions: Mutex::new(UnreadCounter::default()),
        }
    }

    /// A topic inside a forum-style conversation, identified by the topic's
    /// root message id.
    pub fn topic(conversation: Conversation, root: MsgId) -> Self {
        Self {
            topic_root: Some(root),
            ..Self::new(conversation)
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn topic_root(&self) -> Option<MsgId> {
        self.topic_root
    }

    pub fn key(&self) -> ThreadKey {
        ThreadKey {
            conversation: self.conversation.id,
            topic_root: self.topic_root,
        }
    }

    pub fn unread_mentions(&self) -> MutexGuard<'_, UnreadCounter> {
        self.mentions.lock()
    }

    pub fn unread_reactions(&self) -> MutexGuard<'_, UnreadCounter> {
        self.reactions.lock()
    }

    pub fn counter(&self, kind: SignalKind) -> MutexGuard<'_, UnreadCounter> {
        match kind {
            SignalKind::Mentions => self.mentions.lock(),
            SignalKind::Reactions => self.reactions.lock(),
        }
    }
}
