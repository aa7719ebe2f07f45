pub mod blocklist;
pub mod config;
pub mod constants;
pub mod models;
pub mod requests;
pub mod tracker;

// Re-export the main surface at crate root for convenience
pub use blocklist::BlockList;
pub use config::TrackerConfig;
pub use models::{
    AuthorId, Conversation, ConversationId, ConversationKind, MsgId, SignalKind, Thread, ThreadKey,
    UnreadCounter,
};
pub use requests::{
    MessageReactions, ReactionEvent, RequestError, RequestService, UnreadMessage, UnreadPage,
    UnreadPageRequest,
};
pub use tracker::UnreadTracker;
