/// Identifier of a conversation on the remote system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(pub i64);

/// What kind of peer owns a conversation.
///
/// The distinction matters twice: eligibility (mentions are only tracked in
/// group-semantics conversations, reactions also in one-to-one chats) and
/// routing of the content-read call (channel-backed conversations use the
/// channel-scoped variant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationKind {
    /// One-to-one chat with another user.
    Direct,
    /// Basic group chat.
    Group,
    /// Large group backed by channel infrastructure.
    Supergroup,
    /// Broadcast-only channel without group semantics.
    Broadcast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub kind: ConversationKind,
}

impl Conversation {
    pub fn new(id: ConversationId, kind: ConversationKind) -> Self {
        Self { id, kind }
    }

    pub fn is_direct(&self) -> bool {
        self.kind == ConversationKind::Direct
    }

    /// Group semantics: basic groups and supergroups, but not broadcast
    /// channels.
    pub fn is_group_like(&self) -> bool {
        matches!(self.kind, ConversationKind::Group | ConversationKind::Supergroup)
    }

    /// Channel-backed conversations take the channel-scoped content-read
    /// call; everything else takes the generic one.
    pub fn is_channel_backed(&self) -> bool {
        matches!(
            self.kind,
            ConversationKind::Supergroup | ConversationKind::Broadcast
        )
    }
}
