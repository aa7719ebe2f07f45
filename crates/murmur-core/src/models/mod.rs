pub mod conversation;
pub mod counter;
pub mod thread;

pub use conversation::{Conversation, ConversationId, ConversationKind};
pub use counter::{AuthorId, MsgId, UnreadCounter};
pub use thread::{SignalKind, Thread, ThreadKey};
