//! Per-thread unread counters for secondary signals.
//!
//! One `UnreadCounter` exists per thread per signal kind (mentions,
//! reactions). The tracker never creates these; it reads them to decide
//! whether to fetch and mutates them through `set_count`/`add_slice` when
//! responses land.

use crate::requests::UnreadPage;

/// Message identifier on the remote system. `MsgId(0)` means "no bound"
/// where it appears in request descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MsgId(pub i64);

/// Identity of a message author or reactor, as keyed by the block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthorId(pub i64);

/// Unread-item counter with a partially loaded window.
///
/// `count` is the server-reported authoritative total (-1 while unknown).
/// The loaded window is the ascending list of item ids materialized locally;
/// `max_loaded` is monotonic for the lifetime of the counter, even if the
/// window later shrinks.
#[derive(Debug, Clone)]
pub struct UnreadCounter {
    count: i32,
    ids: Vec<MsgId>,
    max_loaded: MsgId,
}

impl Default for UnreadCounter {
    fn default() -> Self {
        Self {
            count: -1,
            ids: Vec::new(),
            max_loaded: MsgId(0),
        }
    }
}

impl UnreadCounter {
    /// Server-reported total, -1 if not yet known.
    pub fn count(&self) -> i32 {
        self.count
    }

    pub fn loaded_count(&self) -> usize {
        self.ids.len()
    }

    /// Highest item id ever seen in the loaded window.
    pub fn max_loaded(&self) -> MsgId {
        self.max_loaded
    }

    pub fn loaded_ids(&self) -> &[MsgId] {
        &self.ids
    }

    /// Install a server-authoritative total.
    ///
    /// If the new total is smaller than the loaded window, the lowest
    /// (oldest) ids are dropped so `loaded_count <= count` keeps holding.
    pub fn set_count(&mut self, count: i32) {
        self.count = count;
        if count >= 0 {
            let limit = count as usize;
            if self.ids.len() > limit {
                let excess = self.ids.len() - limit;
                self.ids.drain(..excess);
            }
        }
    }

    /// Merge a fetched page into the loaded window.
    ///
    /// The merge is keyed by the `loaded_before` cursor the fetch was issued
    /// with: a slice arriving for a cursor that no longer matches the window
    /// is stale and ignored, which makes redelivery of the same page a no-op.
    /// Ids already present (the intentional one-item overlap on continuation
    /// pages) are dropped rather than double-counted.
    pub fn add_slice(&mut self, page: &UnreadPage, loaded_before: usize) {
        let UnreadPage::Slice {
            full_count,
            messages,
        } = page
        else {
            return;
        };
        if loaded_before != self.ids.len() {
            return;
        }
        for message in messages {
            if !self.ids.contains(&message.id) {
                self.ids.push(message.id);
            }
        }
        self.ids.sort_unstable();
        if let Some(last) = self.ids.last() {
            self.max_loaded = self.max_loaded.max(*last);
        }
        match full_count {
            Some(total) => self.count = (*total).max(self.ids.len() as i32),
            None => self.count = self.count.max(self.ids.len() as i32),
        }
    }

    /// Drop a single item from the window after an out-of-band read
    /// notification, decrementing a known total. Ids outside the loaded
    /// window are ignored; the total for such items arrives separately via
    /// `set_count`.
    pub fn erase(&mut self, id: MsgId) {
        if let Some(pos) = self.ids.iter().position(|&i| i == id) {
            self.ids.remove(pos);
            if self.count > 0 {
                self.count -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::{UnreadMessage, UnreadPage};

    fn page(full_count: Option<i32>, ids: &[i64]) -> UnreadPage {
        UnreadPage::Slice {
            full_count,
            messages: ids
                .iter()
                .map(|&id| UnreadMessage {
                    id: MsgId(id),
                    author: AuthorId(1),
                })
                .collect(),
        }
    }

    #[test]
    fn test_add_slice_installs_full_count() {
        let mut counter = UnreadCounter::default();
        counter.add_slice(&page(Some(12), &[3, 5, 8]), 0);
        assert_eq!(counter.count(), 12);
        assert_eq!(counter.loaded_count(), 3);
        assert_eq!(counter.max_loaded(), MsgId(8));
    }

    #[test]
    fn test_add_slice_stale_cursor_is_ignored() {
        let mut counter = UnreadCounter::default();
        counter.add_slice(&page(Some(3), &[3, 5, 8]), 0);
        // Redelivered page carries a cursor that no longer matches the window
        counter.add_slice(&page(Some(3), &[3, 5, 8]), 0);
        assert_eq!(counter.loaded_count(), 3);
    }

    #[test]
    fn test_add_slice_boundary_overlap_not_double_counted() {
        let mut counter = UnreadCounter::default();
        counter.add_slice(&page(Some(5), &[3, 5, 8]), 0);
        // Continuation page re-includes id 8 at the window boundary
        counter.add_slice(&page(Some(5), &[8, 10, 12]), 3);
        assert_eq!(counter.loaded_count(), 5);
        assert_eq!(counter.max_loaded(), MsgId(12));
    }

    #[test]
    fn test_not_modified_leaves_counter_untouched() {
        let mut counter = UnreadCounter::default();
        counter.add_slice(&page(Some(2), &[3, 5]), 0);
        counter.add_slice(&UnreadPage::NotModified, 2);
        assert_eq!(counter.count(), 2);
        assert_eq!(counter.loaded_count(), 2);
    }

    #[test]
    fn test_set_count_below_window_drops_oldest() {
        let mut counter = UnreadCounter::default();
        counter.add_slice(&page(Some(4), &[3, 5, 8, 9]), 0);
        counter.set_count(2);
        assert_eq!(counter.count(), 2);
        assert_eq!(counter.loaded_ids(), &[MsgId(8), MsgId(9)]);
        // max_loaded stays monotonic
        assert_eq!(counter.max_loaded(), MsgId(9));
    }

    #[test]
    fn test_erase_shrinks_window_and_count() {
        let mut counter = UnreadCounter::default();
        counter.add_slice(&page(Some(3), &[3, 5, 8]), 0);
        counter.erase(MsgId(5));
        assert_eq!(counter.count(), 2);
        assert_eq!(counter.loaded_ids(), &[MsgId(3), MsgId(8)]);
        // Ids outside the loaded window are ignored
        counter.erase(MsgId(99));
        assert_eq!(counter.count(), 2);
        assert_eq!(counter.loaded_count(), 2);
    }
}
