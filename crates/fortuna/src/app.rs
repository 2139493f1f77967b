// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition root and presentation-facing handlers.

use std::sync::Arc;

use fortuna_advice::{AdviceClient, HttpAdviceSource};
use fortuna_config::FortunaConfig;
use fortuna_core::{
    AdviceSource, ApiStatus, Clock, FortunaError, HistoryEntry, LuckyNumbers, RemoteId,
    SystemClock,
};
use fortuna_queue::{
    AutoSaver, HistoryMatch, MessageManager, RefillReport, generate_lucky_numbers,
};
use fortuna_resilience::{ApiCallState, BackoffPolicy, ThrottleController};
use fortuna_storage::{KeyValueStore, MemoryBackend, SqliteBackend, StorageKey};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// A served fortune, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fortune {
    pub message: String,
    pub lucky_numbers: LuckyNumbers,
    pub id: Option<RemoteId>,
    /// Fortunes served so far, including this one.
    pub fortune_count: u64,
}

/// Snapshot for the `status` command.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub api_status: ApiStatus,
    pub storage_backend: String,
    pub storage_available: bool,
    pub queue_len: usize,
    pub queue_capacity: usize,
    pub history_len: usize,
    pub fortune_count: u64,
    pub known_ids: usize,
    pub favorites_only: bool,
    pub api_state: ApiCallState,
    pub retry_in_ms: u64,
}

/// Wires store, controller, client and manager, and forwards status changes
/// to subscribers.
pub struct FortuneApp {
    config: FortunaConfig,
    store: Arc<KeyValueStore>,
    controller: Arc<ThrottleController>,
    manager: Arc<MessageManager>,
    status: Arc<watch::Sender<ApiStatus>>,
}

impl FortuneApp {
    /// Build the app over `store`, fetching from `source`.
    pub fn new(
        config: FortunaConfig,
        store: Arc<KeyValueStore>,
        source: Arc<dyn AdviceSource>,
    ) -> Self {
        Self::with_clock(config, store, source, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(
        config: FortunaConfig,
        store: Arc<KeyValueStore>,
        source: Arc<dyn AdviceSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        store.check_version();

        let controller = Arc::new(ThrottleController::new(
            BackoffPolicy::from(&config.advice),
            store.clone(),
            clock.clone(),
        ));
        let client = AdviceClient::new(source, controller.clone());
        let manager = Arc::new(MessageManager::new(
            config.queue.clone(),
            store.clone(),
            client,
            clock,
        ));

        let (status, _) = watch::channel(ApiStatus::Healthy);
        let status = Arc::new(status);
        let sender = status.clone();
        controller.set_status_listener(Arc::new(move |next| {
            sender.send_if_modified(|current| {
                if *current == next {
                    return false;
                }
                *current = next;
                true
            });
        }));

        Self {
            config,
            store,
            controller,
            manager,
            status,
        }
    }

    /// Build the production app: SQLite store (or memory when `ephemeral`)
    /// and the HTTP advice source.
    pub fn from_config(config: FortunaConfig, ephemeral: bool) -> Result<Self, FortunaError> {
        let store = Arc::new(open_store(&config, ephemeral));
        let source = Arc::new(HttpAdviceSource::new(&config.advice)?);
        Ok(Self::new(config, store, source))
    }

    pub fn config(&self) -> &FortunaConfig {
        &self.config
    }

    pub fn manager(&self) -> &Arc<MessageManager> {
        &self.manager
    }

    pub fn controller(&self) -> &Arc<ThrottleController> {
        &self.controller
    }

    /// Fill the queue to capacity and wait for it.
    pub async fn initialize(&self) -> Option<RefillReport> {
        self.manager.refill().await
    }

    /// Serve the next message, record it in history, and return it.
    pub fn handle_cookie_click(&self) -> Fortune {
        let item = self.manager.serve_next();
        let lucky_numbers = generate_lucky_numbers();
        let entry = self
            .manager
            .record_served(item.message, Some(lucky_numbers), item.id);
        let fortune_count = self.manager.fortune_count();
        debug!(fortune_count, "fortune served");
        Fortune {
            message: entry.message,
            lucky_numbers: entry.lucky_numbers,
            id: entry.id,
            fortune_count,
        }
    }

    pub fn handle_toggle_favorite(&self, index: usize) -> Option<bool> {
        let toggled = self.manager.toggle_favorite_at(index);
        if toggled.is_none() {
            warn!(index, "favorite toggle ignored, no such history entry");
        }
        toggled
    }

    pub fn handle_delete(&self, index: usize) -> bool {
        let deleted = self.manager.delete_at(index);
        if deleted {
            info!(index, fortune_count = self.manager.fortune_count(), "history entry deleted");
        } else {
            warn!(index, "delete ignored, no such history entry");
        }
        deleted
    }

    /// History, newest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.manager.history_snapshot()
    }

    /// History filtered by `query` and the stored favorites-only preference.
    pub fn filtered_history(&self, query: &str) -> Vec<HistoryMatch> {
        self.manager.filter_history(query, self.favorites_only())
    }

    pub fn favorites_only(&self) -> bool {
        self.store.get(StorageKey::ShowFavoritesOnly, false)
    }

    pub fn set_favorites_only(&self, enabled: bool) {
        if !self.store.set(StorageKey::ShowFavoritesOnly, &enabled) {
            debug!("favorites preference not persisted");
        }
    }

    /// Report host connectivity. Going offline is signalled immediately;
    /// coming back online is reported as healthy.
    pub fn set_connectivity(&self, online: bool) {
        let status = if online {
            ApiStatus::Healthy
        } else {
            ApiStatus::Offline
        };
        self.controller.emit(status);
    }

    pub fn status(&self) -> ApiStatus {
        *self.status.borrow()
    }

    /// Receiver that observes every status transition.
    pub fn subscribe_status(&self) -> watch::Receiver<ApiStatus> {
        self.status.subscribe()
    }

    pub fn status_report(&self) -> StatusReport {
        StatusReport {
            api_status: self.status(),
            storage_backend: self.store.backend_name().to_string(),
            storage_available: self.store.is_available(),
            queue_len: self.manager.queue_len(),
            queue_capacity: self.config.queue.capacity,
            history_len: self.manager.history_snapshot().len(),
            fortune_count: self.manager.fortune_count(),
            known_ids: self.manager.known_id_count(),
            favorites_only: self.favorites_only(),
            api_state: self.controller.state(),
            retry_in_ms: self.controller.time_until_allowed().as_millis() as u64,
        }
    }

    /// Start the periodic auto-save task.
    pub fn start_auto_save(&self) -> AutoSaver {
        AutoSaver::spawn(
            self.manager.clone(),
            self.controller.clone(),
            self.config.queue.auto_save_interval(),
        )
    }

    /// Stop auto-save and flush anything still dirty.
    pub async fn shutdown(&self, saver: AutoSaver) {
        saver.stop(&self.manager, &self.controller).await;
    }
}

/// Open the configured store. Falls back to a store without persistence when
/// the database cannot be opened.
pub fn open_store(config: &FortunaConfig, ephemeral: bool) -> KeyValueStore {
    let keep = config.storage.quota_recovery_keep;
    if ephemeral {
        let backend = MemoryBackend::with_quota(config.storage.quota_bytes);
        return KeyValueStore::new(Arc::new(backend), keep);
    }
    match SqliteBackend::open(&config.storage) {
        Ok(backend) => KeyValueStore::new(Arc::new(backend), keep),
        Err(e) => {
            warn!(
                path = %config.storage.database_path,
                error = %e,
                "failed to open database, continuing without persistence"
            );
            KeyValueStore::disabled()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortuna_core::{ManualClock, QueueItem};
    use fortuna_queue::messages::WISDOM;
    use fortuna_test_utils::MockAdviceSource;

    fn app() -> FortuneApp {
        FortuneApp::with_clock(
            FortunaConfig::default(),
            Arc::new(KeyValueStore::new(Arc::new(MemoryBackend::new()), 10)),
            Arc::new(MockAdviceSource::new()),
            Arc::new(ManualClock::new(1_700_000_000_000)),
        )
    }

    #[test]
    fn cookie_click_serves_and_records() {
        let app = app();
        let fortune = app.handle_cookie_click();
        assert_eq!(fortune.message, WISDOM[0]);
        assert_eq!(fortune.fortune_count, 1);
        assert!(fortune.lucky_numbers.is_well_formed());

        let history = app.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].lucky_numbers, fortune.lucky_numbers);
    }

    #[test]
    fn favorite_and_delete_report_out_of_bounds() {
        let app = app();
        assert_eq!(app.handle_toggle_favorite(0), None);
        assert!(!app.handle_delete(0));
        app.handle_cookie_click();
        assert_eq!(app.handle_toggle_favorite(0), Some(true));
        assert!(app.handle_delete(0));
        assert_eq!(app.manager().fortune_count(), 0);
    }

    #[test]
    fn favorites_only_preference_persists() {
        let app = app();
        assert!(!app.favorites_only());
        app.set_favorites_only(true);
        assert!(app.favorites_only());

        app.handle_cookie_click();
        app.handle_cookie_click();
        app.handle_toggle_favorite(1);
        let matches = app.filtered_history("");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].index, 1);
    }

    #[test]
    fn status_changes_are_published_once() {
        let app = app();
        let mut rx = app.subscribe_status();
        assert_eq!(app.status(), ApiStatus::Healthy);

        app.set_connectivity(true);
        assert!(!rx.has_changed().unwrap(), "healthy to healthy is not a change");

        app.set_connectivity(false);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ApiStatus::Offline);

        app.controller().record_failure();
        assert_eq!(app.status(), ApiStatus::Degraded);
        app.controller().record_success();
        assert_eq!(app.status(), ApiStatus::Healthy);
    }

    #[test]
    fn status_report_reflects_state() {
        let app = app();
        app.handle_cookie_click();
        let report = app.status_report();
        assert_eq!(report.queue_len, WISDOM.len() - 1);
        assert_eq!(report.history_len, 1);
        assert_eq!(report.fortune_count, 1);
        assert!(report.storage_available);
        assert_eq!(report.storage_backend, "memory");
    }

    #[test]
    fn ephemeral_store_is_in_memory() {
        let store = open_store(&FortunaConfig::default(), true);
        assert!(store.is_available());
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn unopenable_database_disables_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let mut config = FortunaConfig::default();
        config.storage.database_path = blocker.join("fortuna.db").display().to_string();
        let store = open_store(&config, false);
        assert!(!store.is_available());
    }

    #[test]
    fn fortune_serializes_for_display() {
        let fortune = Fortune {
            message: "m".into(),
            lucky_numbers: LuckyNumbers::new(vec![1, 2, 3, 4, 5, 6]),
            id: QueueItem::remote(3, "m").id,
            fortune_count: 2,
        };
        let json = serde_json::to_value(&fortune).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["lucky_numbers"][0], 1);
    }
}
