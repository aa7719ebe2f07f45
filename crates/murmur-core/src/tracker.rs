//! Unread secondary-signal synchronizer.
//!
//! Keeps the per-thread unread-mentions and unread-reactions counters in
//! sync with the remote server: preloads enough unread items for threads the
//! UI observes, paginates further fetches, deduplicates so at most one
//! request per (thread, signal) is ever in flight, and reconciles
//! server-reported raw totals against the block list.
//!
//! Every public operation returns immediately; counter mutations happen on
//! spawned tasks when the corresponding fetch resolves. The in-flight map is
//! the single serialization point: an entry is registered before a fetch is
//! spawned and removed unconditionally in both terminal paths, so a stuck
//! request keeps its (thread, signal) deduplicated until `cancel_tracking`.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use parking_lot::Mutex;

use crate::blocklist::BlockList;
use crate::config::TrackerConfig;
use crate::constants::{FIRST_REQUEST_LIMIT, NEXT_REQUEST_LIMIT, PRELOAD_IF_LESS};
use crate::models::{Conversation, MsgId, SignalKind, Thread, ThreadKey};
use crate::requests::{RequestService, UnreadPage, UnreadPageRequest};

struct InFlight {
    id: u64,
    abort: AbortHandle,
}

struct State {
    in_flight: HashMap<(ThreadKey, SignalKind), InFlight>,
    next_request_id: u64,
}

pub struct UnreadTracker {
    service: Arc<dyn RequestService>,
    blocks: Arc<dyn BlockList>,
    config: TrackerConfig,
    state: Mutex<State>,
}

impl UnreadTracker {
    pub fn new(
        service: Arc<dyn RequestService>,
        blocks: Arc<dyn BlockList>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            service,
            blocks,
            config,
            state: Mutex::new(State {
                in_flight: HashMap::new(),
                next_request_id: 1,
            }),
        }
    }

    // ===== Eligibility =====

    /// Mentions are tracked only in conversations with group semantics.
    pub fn tracks_mentions(&self, thread: Option<&Thread>) -> bool {
        thread.is_some_and(|t| t.conversation().is_group_like())
    }

    /// Reactions are tracked in one-to-one chats as well as groups, but
    /// never in broadcast-only channels.
    pub fn tracks_reactions(&self, thread: Option<&Thread>) -> bool {
        thread.is_some_and(|t| {
            t.conversation().is_direct() || t.conversation().is_group_like()
        })
    }

    // ===== Preload engine =====

    /// Make sure enough unread items are loaded for a thread the UI is
    /// about to show. Issues at most one paginated fetch per eligible
    /// signal kind; a no-op while the total is unknown, already satisfied,
    /// or a fetch is already in flight.
    pub fn ensure_preloaded(self: &Arc<Self>, thread: &Arc<Thread>) {
        if self.tracks_mentions(Some(thread)) {
            self.preload_enough(thread, SignalKind::Mentions);
        }
        if self.tracks_reactions(Some(thread)) {
            self.preload_enough(thread, SignalKind::Reactions);
        }
    }

    fn preload_enough(self: &Arc<Self>, thread: &Arc<Thread>, kind: SignalKind) {
        let (full_count, loaded_count) = {
            let counter = thread.counter(kind);
            (counter.count(), counter.loaded_count())
        };
        let all_loaded = full_count >= 0 && loaded_count >= full_count as usize;
        if full_count >= 0 && loaded_count < PRELOAD_IF_LESS && !all_loaded {
            self.request_slice(thread, kind, loaded_count);
        }
    }

    /// Issue one paginated unread-items fetch for (thread, kind), starting
    /// after `loaded` already-materialized items. Silently returns if a
    /// fetch for the pair is already in flight.
    fn request_slice(self: &Arc<Self>, thread: &Arc<Thread>, kind: SignalKind, loaded: usize) {
        let key = (thread.key(), kind);
        let Some((request_id, abort_reg)) = self.begin(key) else {
            return;
        };
        let limit = if loaded > 0 {
            NEXT_REQUEST_LIMIT
        } else {
            FIRST_REQUEST_LIMIT
        };
        // Continuation pages deliberately overlap the loaded window by one
        // item so nothing at the boundary is skipped.
        let add_offset = if loaded > 0 { -(limit + 1) } else { -limit };
        let offset_id = match kind {
            SignalKind::Mentions => thread.unread_mentions().max_loaded().max(MsgId(1)),
            SignalKind::Reactions if loaded == 0 => MsgId(1),
            SignalKind::Reactions => thread.unread_reactions().max_loaded().max(MsgId(1)),
        };
        let request = UnreadPageRequest {
            conversation: thread.conversation().id,
            topic_root: thread.topic_root(),
            offset_id,
            add_offset,
            limit,
            max_id: MsgId(0),
            min_id: MsgId(0),
        };
        tracing::debug!(
            "Requesting unread {:?} slice for {:?} (loaded {}, limit {})",
            kind,
            key.0,
            loaded,
            limit
        );
        let fut = match kind {
            SignalKind::Mentions => self.service.unread_mentions_slice(request),
            SignalKind::Reactions => self.service.unread_reactions_slice(request),
        };
        let this = Arc::clone(self);
        let thread = Arc::clone(thread);
        tokio::spawn(Abortable::new(
            async move {
                match fut.await {
                    Ok(page) => {
                        this.finish(key, request_id);
                        thread.counter(kind).add_slice(&page, loaded);
                    }
                    Err(err) => {
                        this.finish(key, request_id);
                        tracing::debug!("Unread {:?} fetch failed for {:?}: {}", kind, key.0, err);
                    }
                }
            },
            abort_reg,
        ));
    }

    // ===== Cancellation =====

    /// Stop tracking a thread: drop any in-flight fetch for either signal
    /// kind. The map entries are gone before this returns; the underlying
    /// transport cancellation is fire-and-forget.
    pub fn cancel_tracking(&self, thread: &Thread) {
        let key = thread.key();
        let mut state = self.state.lock();
        for kind in [SignalKind::Mentions, SignalKind::Reactions] {
            if let Some(in_flight) = state.in_flight.remove(&(key, kind)) {
                in_flight.abort.abort();
            }
        }
    }

    // ===== Server-total reconciliation =====

    /// Install a server-reported raw unread-mentions total, reduced by
    /// mentions authored by blocked peers.
    ///
    /// The reduction fetches the whole unread window sized to the reported
    /// total, marks the blocked-authored items read on the server, and
    /// installs the difference. Falls back to installing the raw total when
    /// the feature is disabled, the total is zero, the thread does not
    /// track mentions, a mentions fetch is already in flight, or the fetch
    /// fails.
    pub fn reconcile_mentions_count(
        self: &Arc<Self>,
        thread: &Arc<Thread>,
        reported_total: i32,
    ) {
        if !self.config.filter_blocked_authors
            || reported_total == 0
            || !self.tracks_mentions(Some(thread))
        {
            thread.unread_mentions().set_count(reported_total);
            return;
        }
        let key = (thread.key(), SignalKind::Mentions);
        let Some((request_id, abort_reg)) = self.begin(key) else {
            thread.unread_mentions().set_count(reported_total);
            return;
        };
        let fut = self
            .service
            .unread_mentions_slice(self.whole_window_request(thread, reported_total));
        let this = Arc::clone(self);
        let thread = Arc::clone(thread);
        tokio::spawn(Abortable::new(
            async move {
                match fut.await {
                    Ok(page) => {
                        this.finish(key, request_id);
                        let mut to_read = Vec::new();
                        if let UnreadPage::Slice { messages, .. } = &page {
                            for message in messages {
                                if this.blocks.is_blocked(message.author) {
                                    to_read.push(message.id);
                                }
                            }
                        }
                        // The reported total is a hint; the window can come
                        // back larger than it.
                        let filtered = (reported_total - to_read.len() as i32).max(0);
                        this.read_message_contents(thread.conversation(), to_read);
                        thread.unread_mentions().set_count(filtered);
                    }
                    Err(err) => {
                        this.finish(key, request_id);
                        tracing::warn!("Unread mentions reconciliation fetch failed: {}", err);
                        thread.unread_mentions().set_count(reported_total);
                    }
                }
            },
            abort_reg,
        ));
    }

    /// Install a server-reported raw unread-reactions total, reduced by
    /// messages whose every unread reaction comes from a blocked reactor.
    ///
    /// Needs two fetches: the unread-reactions window yields message ids
    /// only, then a reaction-details fetch yields per-message reaction
    /// events with reactor identity and an unread flag. A message joins the
    /// mark-read batch only when none of its unread reaction events was
    /// authored by a non-blocked reactor. Any failure, and an empty first
    /// page, fall back to installing the raw total.
    pub fn reconcile_reactions_count(
        self: &Arc<Self>,
        thread: &Arc<Thread>,
        reported_total: i32,
    ) {
        if !self.config.filter_blocked_authors
            || reported_total == 0
            || !self.tracks_reactions(Some(thread))
        {
            thread.unread_reactions().set_count(reported_total);
            return;
        }
        let key = (thread.key(), SignalKind::Reactions);
        let Some((request_id, abort_reg)) = self.begin(key) else {
            thread.unread_reactions().set_count(reported_total);
            return;
        };
        let fut = self
            .service
            .unread_reactions_slice(self.whole_window_request(thread, reported_total));
        let this = Arc::clone(self);
        let thread = Arc::clone(thread);
        tokio::spawn(Abortable::new(
            async move {
                let page = match fut.await {
                    Ok(page) => {
                        this.finish(key, request_id);
                        page
                    }
                    Err(err) => {
                        this.finish(key, request_id);
                        tracing::warn!("Unread reactions reconciliation fetch failed: {}", err);
                        thread.unread_reactions().set_count(reported_total);
                        return;
                    }
                };
                let messages = match &page {
                    UnreadPage::Slice { messages, .. } if !messages.is_empty() => messages,
                    // Nothing to inspect; apply the raw total directly.
                    _ => {
                        thread.unread_reactions().set_count(reported_total);
                        return;
                    }
                };
                let ids: Vec<MsgId> = messages.iter().map(|m| m.id).collect();
                // The details fetch is not tracked in the dedup map: the
                // reactions entry was released when the first fetch landed.
                match this
                    .service
                    .message_reactions(thread.conversation().id, ids)
                    .await
                {
                    Ok(details) => {
                        let mut to_read = Vec::new();
                        for detail in &details {
                            let visible_to_user = detail
                                .reactions
                                .iter()
                                .any(|r| r.unread && !this.blocks.is_blocked(r.reactor));
                            if !visible_to_user {
                                to_read.push(detail.message);
                            }
                        }
                        let filtered = (reported_total - to_read.len() as i32).max(0);
                        this.read_message_contents(thread.conversation(), to_read);
                        thread.unread_reactions().set_count(filtered);
                    }
                    Err(err) => {
                        tracing::warn!("Reaction details fetch failed: {}", err);
                        thread.unread_reactions().set_count(reported_total);
                    }
                }
            },
            abort_reg,
        ));
    }

    // ===== Out-of-band read notifications =====

    /// The server (or another device) reported these items as read; drop
    /// them from the thread's counter without any remote call.
    pub fn apply_read(&self, thread: &Thread, kind: SignalKind, messages: &[MsgId]) {
        let mut counter = thread.counter(kind);
        for &id in messages {
            counter.erase(id);
        }
    }

    // ===== Internals =====

    /// The oversized single page used by reconciliation: the entire unread
    /// window from id 1, sized to the reported total.
    fn whole_window_request(&self, thread: &Thread, reported_total: i32) -> UnreadPageRequest {
        UnreadPageRequest {
            conversation: thread.conversation().id,
            topic_root: thread.topic_root(),
            offset_id: MsgId(1),
            add_offset: -reported_total,
            limit: reported_total,
            max_id: MsgId(0),
            min_id: MsgId(0),
        }
    }

    /// Mark message contents read on the server, fire-and-forget. Routes to
    /// the channel-scoped call for channel-backed conversations.
    fn read_message_contents(&self, conversation: &Conversation, messages: Vec<MsgId>) {
        if messages.is_empty() {
            return;
        }
        tracing::debug!(
            "Marking {} message(s) read in {:?}",
            messages.len(),
            conversation.id
        );
        let fut = if conversation.is_channel_backed() {
            self.service.read_channel_contents(conversation.id, messages)
        } else {
            self.service.read_contents(messages)
        };
        tokio::spawn(async move {
            if let Err(err) = fut.await {
                tracing::warn!("Content read-marking failed: {}", err);
            }
        });
    }

    /// Register an in-flight entry for `key`, unless one already exists.
    /// Registration happens before the fetch is spawned so a synchronous
    /// completion can never observe a missing entry.
    fn begin(&self, key: (ThreadKey, SignalKind)) -> Option<(u64, AbortRegistration)> {
        let mut state = self.state.lock();
        if state.in_flight.contains_key(&key) {
            return None;
        }
        let id = state.next_request_id;
        state.next_request_id += 1;
        let (abort, registration) = AbortHandle::new_pair();
        state.in_flight.insert(key, InFlight { id, abort });
        Some((id, registration))
    }

    /// Remove the in-flight entry for `key`, but only if it still belongs
    /// to request `id` — `cancel_tracking` may already have replaced it.
    fn finish(&self, key: (ThreadKey, SignalKind), id: u64) {
        let mut state = self.state.lock();
        if state.in_flight.get(&key).is_some_and(|f| f.id == id) {
            state.in_flight.remove(&key);
        }
    }

    #[cfg(test)]
    fn in_flight_count(&self) -> usize {
        self.state.lock().in_flight.len()
    }
}
