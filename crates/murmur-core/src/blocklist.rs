use crate::models::AuthorId;

/// Query interface over the externally maintained blocked-peer set.
///
/// The tracker consults this during reconciliation to decide which unread
/// items should not count toward the user. Membership may change at any time;
/// the tracker reads it once per fetched item and never caches the answer.
pub trait BlockList: Send + Sync {
    fn is_blocked(&self, author: AuthorId) -> bool;
}
