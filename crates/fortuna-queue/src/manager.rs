// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message queue manager.
//!
//! All mutable state sits behind one mutex that is never held across an
//! await point. Every mutation is persisted immediately; persistence failures
//! are logged and leave the in-memory state as the source of truth.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fortuna_advice::AdviceClient;
use fortuna_config::model::QueueConfig;
use fortuna_core::{Clock, HistoryEntry, LuckyNumbers, QueueItem, RemoteId};
use fortuna_storage::{KeyValueStore, StorageKey, records};
use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::known_ids::KnownIdSet;
use crate::lucky::generate_lucky_numbers;
use crate::messages;

/// Attempts between refill progress log lines.
const PROGRESS_LOG_INTERVAL: usize = 5;

/// Outcome of a completed refill loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefillReport {
    pub attempts: usize,
    pub added: usize,
}

/// A history entry that passed a filter, with its position in the full list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMatch {
    pub index: usize,
    pub entry: HistoryEntry,
}

#[derive(Debug)]
struct QueueState {
    /// Front is served next.
    queue: VecDeque<QueueItem>,
    /// Newest first.
    history: Vec<HistoryEntry>,
    fortune_count: u64,
    known_ids: KnownIdSet,
}

/// Owns the queue, the history, the fortune counter, and the known-id set.
pub struct MessageManager {
    config: QueueConfig,
    store: Arc<KeyValueStore>,
    client: AdviceClient,
    clock: Arc<dyn Clock>,
    state: Mutex<QueueState>,
    dirty: AtomicBool,
    filling: AtomicBool,
    tracker: TaskTracker,
}

impl MessageManager {
    /// Create a manager, reconciling built-in messages with persisted state.
    pub fn new(
        config: QueueConfig,
        store: Arc<KeyValueStore>,
        client: AdviceClient,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = load_state(&config, &store);
        Self {
            config,
            store,
            client,
            clock,
            state: Mutex::new(state),
            dirty: AtomicBool::new(false),
            filling: AtomicBool::new(false),
            tracker: TaskTracker::new(),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn client(&self) -> &AdviceClient {
        &self.client
    }

    /// Pop the next message, or hand out a filler when the queue is empty.
    ///
    /// Never blocks. A refill is scheduled in the background either way.
    pub fn serve_next(self: &Arc<Self>) -> QueueItem {
        let popped = {
            let mut state = self.lock_state();
            let popped = state.queue.pop_front();
            if popped.is_some() {
                self.dirty.store(true, Ordering::SeqCst);
            }
            popped
        };

        let item = match popped {
            Some(item) => {
                debug!(
                    id = ?item.id,
                    builtin = item.is_builtin(),
                    "serving queued message"
                );
                self.save();
                item
            }
            None => {
                let item = messages::filler();
                debug!(message = %item.message, "queue empty, serving filler");
                item
            }
        };

        self.trigger_refill();
        item
    }

    /// Prepend a history entry for a served message and bump the counter.
    ///
    /// Lucky numbers are generated when `lucky_numbers` is `None`.
    pub fn record_served(
        &self,
        message: impl Into<String>,
        lucky_numbers: Option<LuckyNumbers>,
        id: Option<RemoteId>,
    ) -> HistoryEntry {
        let entry = HistoryEntry {
            message: message.into(),
            timestamp: self.clock.now_ms(),
            is_favorite: false,
            lucky_numbers: lucky_numbers.unwrap_or_else(generate_lucky_numbers),
            id,
        };

        {
            let mut state = self.lock_state();
            if let Some(id) = &entry.id {
                state.known_ids.insert(id.clone());
            }
            state.history.insert(0, entry.clone());
            state.history.truncate(self.config.max_history);
            state.fortune_count = state.fortune_count.saturating_add(1);
            self.dirty.store(true, Ordering::SeqCst);
        }
        self.save();
        entry
    }

    /// Remove the history entry at `index`. Returns false when out of bounds.
    pub fn delete_at(&self, index: usize) -> bool {
        let count = {
            let mut state = self.lock_state();
            if index >= state.history.len() {
                return false;
            }
            state.history.remove(index);
            state.fortune_count = state.fortune_count.saturating_sub(1);
            self.dirty.store(true, Ordering::SeqCst);
            state.fortune_count
        };
        self.save();
        debug!(index, fortune_count = count, "deleted history entry");
        true
    }

    /// Flip the favorite flag at `index`, returning the new value, or `None`
    /// when out of bounds.
    pub fn toggle_favorite_at(&self, index: usize) -> Option<bool> {
        let is_favorite = {
            let mut state = self.lock_state();
            let entry = state.history.get_mut(index)?;
            entry.is_favorite = !entry.is_favorite;
            self.dirty.store(true, Ordering::SeqCst);
            entry.is_favorite
        };
        self.save();
        debug!(index, is_favorite, "toggled favorite");
        Some(is_favorite)
    }

    /// Schedule a background refill on the current runtime.
    ///
    /// Returns false when called outside a tokio runtime.
    pub fn trigger_refill(self: &Arc<Self>) -> bool {
        let Ok(handle) = Handle::try_current() else {
            debug!("no async runtime, refill not scheduled");
            return false;
        };
        let this = Arc::clone(self);
        self.tracker.spawn_on(
            async move {
                this.refill().await;
            },
            &handle,
        );
        true
    }

    /// Await every background refill scheduled so far.
    pub async fn wait_for_background(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Fill the queue toward capacity from the remote source.
    ///
    /// Returns `None` without doing anything when another refill is running.
    /// The loop ends when the queue is full or the attempt budget is spent.
    pub async fn refill(&self) -> Option<RefillReport> {
        let Some(_guard) = FillGuard::acquire(&self.filling) else {
            debug!("queue fill already in progress, skipping");
            return None;
        };

        let capacity = self.config.capacity;
        let max_attempts = self.config.max_attempts();
        let controller = self.client.controller();
        let throttle = controller.policy().throttle();
        let max_wait = controller.policy().max_wait();
        let mut report = RefillReport::default();

        debug!(queue_len = self.queue_len(), capacity, "starting queue fill");

        while self.queue_len() < capacity && report.attempts < max_attempts {
            report.attempts += 1;
            let started = Instant::now();

            if self.add_message().await {
                report.added += 1;
            }

            if report.attempts % PROGRESS_LOG_INTERVAL == 0 {
                debug!(
                    attempts = report.attempts,
                    max_attempts,
                    added = report.added,
                    queue_len = self.queue_len(),
                    "queue fill progress"
                );
            }

            if self.queue_len() < capacity {
                let remainder = throttle.saturating_sub(started.elapsed());
                let wait = remainder.max(controller.time_until_allowed()).min(max_wait);
                tokio::time::sleep(wait).await;
            }
        }

        if report.attempts >= max_attempts && self.queue_len() < capacity {
            warn!(
                max_attempts,
                added = report.added,
                "queue fill stopped after exhausting attempts, remote pool may be saturated"
            );
        }
        info!(
            added = report.added,
            attempts = report.attempts,
            queue_len = self.queue_len(),
            "queue fill complete"
        );
        Some(report)
    }

    /// One gated fetch. Returns whether a new message was queued.
    async fn add_message(&self) -> bool {
        let controller = self.client.controller();
        if !controller.can_call_now() {
            return false;
        }
        controller.record_call_start();

        let Some(item) = self.client.fetch_one().await else {
            return false;
        };

        {
            let mut state = self.lock_state();
            if let Some(id) = &item.id {
                if !state.known_ids.insert(id.clone()) {
                    debug!(%id, queue_len = state.queue.len(), "skipping duplicate remote message");
                    return false;
                }
            }
            debug!(id = ?item.id, queue_len = state.queue.len() + 1, "queued remote message");
            state.queue.push_front(item);
            self.dirty.store(true, Ordering::SeqCst);
        }
        self.save();
        true
    }

    pub fn is_refilling(&self) -> bool {
        self.filling.load(Ordering::SeqCst)
    }

    pub fn queue_len(&self) -> usize {
        self.lock_state().queue.len()
    }

    pub fn queue_snapshot(&self) -> Vec<QueueItem> {
        self.lock_state().queue.iter().cloned().collect()
    }

    /// History, newest first.
    pub fn history_snapshot(&self) -> Vec<HistoryEntry> {
        self.lock_state().history.clone()
    }

    pub fn fortune_count(&self) -> u64 {
        self.lock_state().fortune_count
    }

    pub fn known_id_count(&self) -> usize {
        self.lock_state().known_ids.len()
    }

    pub fn is_known(&self, id: &RemoteId) -> bool {
        self.lock_state().known_ids.contains(id)
    }

    /// History entries matching `query` (case-insensitive, against the
    /// message or any lucky number) and, optionally, only favorites.
    ///
    /// A blank query matches everything.
    pub fn filter_history(&self, query: &str, favorites_only: bool) -> Vec<HistoryMatch> {
        let query = query.trim().to_lowercase();
        self.lock_state()
            .history
            .iter()
            .enumerate()
            .filter(|(_, entry)| !favorites_only || entry.is_favorite)
            .filter(|(_, entry)| query.is_empty() || matches_query(entry, &query))
            .map(|(index, entry)| HistoryMatch {
                index,
                entry: entry.clone(),
            })
            .collect()
    }

    /// Whether anything changed since the last successful save.
    pub fn has_changes(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Persist queue, history, count and known ids.
    ///
    /// The known-id set is trimmed to its bound first, in memory as well.
    /// Returns whether every entry was written.
    pub fn save(&self) -> bool {
        let mut state = self.lock_state();
        let evicted = state.known_ids.trim();
        if evicted > 0 {
            debug!(evicted, kept = state.known_ids.len(), "trimmed known ids");
        }

        let results = [
            self.store.set(StorageKey::MessageQueue, &state.queue),
            self.store.set(StorageKey::FortuneHistory, &state.history),
            self.store.set(StorageKey::FortuneCount, &state.fortune_count),
            self.store.set(StorageKey::KnownIds, &state.known_ids.to_vec()),
        ];
        let saved = results.iter().all(|ok| *ok);
        if saved {
            self.dirty.store(false, Ordering::SeqCst);
        }
        saved
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn matches_query(entry: &HistoryEntry, query: &str) -> bool {
    entry.message.to_lowercase().contains(query)
        || entry
            .lucky_numbers
            .as_slice()
            .iter()
            .any(|n| n.to_string().contains(query))
}

/// Reconcile built-ins, the persisted queue, history, count and known ids.
fn load_state(config: &QueueConfig, store: &KeyValueStore) -> QueueState {
    let saved_queue = records::load_queue(store);
    let history = records::load_history(store, config.max_history);
    let fortune_count: u64 = store.get(StorageKey::FortuneCount, 0);
    let mut known_ids = KnownIdSet::from_ids(records::load_known_ids(store), config.max_known_ids);
    let persisted_ids = known_ids.len();

    let builtins = messages::builtin_items();
    let queue: VecDeque<QueueItem> = if saved_queue.is_empty() {
        builtins.into()
    } else {
        let unique_builtins: Vec<QueueItem> = builtins
            .into_iter()
            .filter(|b| !saved_queue.iter().any(|saved| saved.message == b.message))
            .collect();
        saved_queue.into_iter().chain(unique_builtins).collect()
    };

    let discovered = queue
        .iter()
        .filter_map(|item| item.id.clone())
        .chain(history.iter().filter_map(|entry| entry.id.clone()));
    for id in discovered {
        known_ids.insert(id);
    }

    info!(
        queue_len = queue.len(),
        history_len = history.len(),
        fortune_count,
        known_ids = known_ids.len(),
        persisted_ids,
        "loaded message state"
    );

    QueueState {
        queue,
        history,
        fortune_count,
        known_ids,
    }
}

/// Clears the single-flight flag when the refill loop ends, however it ends.
struct FillGuard<'a>(&'a AtomicBool);

impl<'a> FillGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FillGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
