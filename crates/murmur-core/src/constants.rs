//! Tuning constants for the unread preload engine.
//!
//! These are client-side heuristics, not protocol requirements: the preload
//! threshold and page limits can be adjusted without breaking the remote
//! pagination contract.

/// Keep fetching pages while fewer than this many unread items are loaded
/// for a thread (and the server total says more exist).
pub const PRELOAD_IF_LESS: usize = 5;

/// Page size for the first unread-items fetch of a thread.
pub const FIRST_REQUEST_LIMIT: i32 = 10;

/// Page size for continuation fetches.
pub const NEXT_REQUEST_LIMIT: i32 = 100;
