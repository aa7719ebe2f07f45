/// Tracker behavior switches.
#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    /// When enabled, a server-reported unread total triggers the
    /// reconciliation path: fetch the unread window, mark blocked-author
    /// items read on the server, and install the reduced count. When
    /// disabled the reported total is installed as-is.
    pub filter_blocked_authors: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            filter_blocked_authors: false,
        }
    }
}
