// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The never-raising key-value facade used by the rest of the engine.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::backend::KvBackend;
use crate::keys::StorageKey;
use crate::memory::MemoryBackend;

/// Version of the persisted JSON layout.
pub const CURRENT_STORAGE_VERSION: u32 = 1;

/// Sentinel key written and removed once to probe the medium.
const PROBE_KEY: &str = "__storage_test__";

/// JSON key-value store over a [`KvBackend`].
///
/// Availability is probed once at construction. When the probe fails every
/// read returns its default and every write returns `false`; callers keep
/// working with in-memory state only.
pub struct KeyValueStore {
    backend: Arc<dyn KvBackend>,
    available: bool,
    quota_recovery_keep: usize,
}

impl KeyValueStore {
    /// Wrap `backend`, probing it once.
    ///
    /// `quota_recovery_keep` is the number of newest history entries kept when
    /// a write runs into the size limit.
    pub fn new(backend: Arc<dyn KvBackend>, quota_recovery_keep: usize) -> Self {
        let available = probe(backend.as_ref());
        if !available {
            warn!(
                backend = backend.name(),
                "storage is not available, continuing without persistence"
            );
        }
        Self {
            backend,
            available,
            quota_recovery_keep,
        }
    }

    /// A store with no working medium.
    pub fn disabled() -> Self {
        Self::new(Arc::new(MemoryBackend::unavailable()), 0)
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Read and deserialize `key`, falling back to `default` on any fault.
    pub fn get<T: DeserializeOwned>(&self, key: StorageKey, default: T) -> T {
        let Some(value) = self.get_json(key) else {
            return default;
        };
        match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(key = %key, error = %e, "stored value has unexpected shape, using default");
                default
            }
        }
    }

    /// Read `key` as untyped JSON. `None` when missing, unparseable, or the
    /// medium is unavailable.
    pub fn get_json(&self, key: StorageKey) -> Option<Value> {
        if !self.available {
            return None;
        }
        let raw = match self.backend.read(key.as_ref()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!(key = %key, error = %e, "failed to read item from storage");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(key = %key, error = %e, "failed to parse stored item");
                None
            }
        }
    }

    /// Serialize and write `value` under `key`. Returns whether it was stored.
    ///
    /// A quota-exceeded write triggers one recovery: stored history is cut to
    /// its newest entries and the write is retried once.
    pub fn set<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> bool {
        if !self.available {
            return false;
        }
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                error!(key = %key, error = %e, "failed to serialize item for storage");
                return false;
            }
        };

        match self.backend.write(key.as_ref(), &json) {
            Ok(()) => true,
            Err(e) if e.is_quota_exceeded() => {
                error!(key = %key, "storage quota exceeded, attempting to clear old data");
                self.clear_old_history();
                match self.backend.write(key.as_ref(), &json) {
                    Ok(()) => true,
                    Err(retry) => {
                        error!(key = %key, error = %retry, "failed to save after clearing old data");
                        false
                    }
                }
            }
            Err(e) => {
                error!(key = %key, error = %e, "failed to write item to storage");
                false
            }
        }
    }

    /// Cut the stored history down to `quota_recovery_keep` newest entries.
    fn clear_old_history(&self) {
        let Some(Value::Array(mut history)) = self.get_json(StorageKey::FortuneHistory) else {
            return;
        };
        if history.len() <= self.quota_recovery_keep {
            return;
        }
        history.truncate(self.quota_recovery_keep);

        let written = serde_json::to_string(&history)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.backend
                    .write(StorageKey::FortuneHistory.as_ref(), &json)
                    .map_err(|e| e.to_string())
            });
        match written {
            Ok(()) => info!(
                kept = self.quota_recovery_keep,
                "cleared old history items to free up space"
            ),
            Err(e) => warn!(error = %e, "failed to shrink stored history"),
        }
    }

    /// Bump the schema version marker if the stored one is behind.
    ///
    /// Returns the version found before any upgrade.
    pub fn check_version(&self) -> u32 {
        let stored: u32 = self.get(StorageKey::Version, 0);
        if stored < CURRENT_STORAGE_VERSION {
            info!(
                from = stored,
                to = CURRENT_STORAGE_VERSION,
                "migrating storage version"
            );
            self.set(StorageKey::Version, &CURRENT_STORAGE_VERSION);
        }
        stored
    }
}

/// Write then remove a sentinel key.
fn probe(backend: &dyn KvBackend) -> bool {
    backend
        .write(PROBE_KEY, PROBE_KEY)
        .and_then(|()| backend.remove(PROBE_KEY))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    fn store_with(backend: Arc<MemoryBackend>) -> KeyValueStore {
        KeyValueStore::new(backend, 10)
    }

    #[test]
    fn probe_leaves_no_sentinel_behind() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(backend.clone());
        assert!(store.is_available());
        assert!(backend.is_empty());
    }

    #[test]
    fn get_returns_default_for_missing_key() {
        let store = store_with(Arc::new(MemoryBackend::new()));
        assert_eq!(store.get(StorageKey::FortuneCount, 3u64), 3);
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = store_with(Arc::new(MemoryBackend::new()));
        assert!(store.set(StorageKey::FortuneCount, &42u64));
        assert_eq!(store.get(StorageKey::FortuneCount, 0u64), 42);
    }

    #[traced_test]
    #[test]
    fn corrupt_entry_falls_back_to_default() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("fortune_count", "{not json").unwrap();
        let store = store_with(backend);
        assert_eq!(store.get(StorageKey::FortuneCount, 5u64), 5);
        assert!(logs_contain("failed to parse stored item"));
    }

    #[test]
    fn wrong_shape_falls_back_to_default() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("fortune_count", "\"seven\"").unwrap();
        let store = store_with(backend);
        assert_eq!(store.get(StorageKey::FortuneCount, 1u64), 1);
    }

    #[test]
    fn unavailable_medium_degrades_to_defaults() {
        let store = KeyValueStore::disabled();
        assert!(!store.is_available());
        assert!(!store.set(StorageKey::FortuneCount, &1u64));
        assert_eq!(store.get(StorageKey::FortuneCount, 9u64), 9);
        assert_eq!(store.get_json(StorageKey::MessageQueue), None);
    }

    #[test]
    fn probe_failure_is_cached() {
        let backend = Arc::new(MemoryBackend::unavailable());
        let store = store_with(backend.clone());
        backend.set_available(true);
        assert!(!store.set(StorageKey::FortuneCount, &1u64));
        assert!(backend.is_empty());
    }

    #[traced_test]
    #[test]
    fn quota_exceeded_truncates_history_and_retries() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(backend.clone());

        let history: Vec<_> = (0..20)
            .map(|i| json!({"message": format!("fortune number {i}"), "timestamp": i}))
            .collect();
        assert!(store.set(StorageKey::FortuneHistory, &history));
        let history_bytes = backend.peek("fortune_history").unwrap().len() as u64;

        // Leave room for roughly half the history plus the new value.
        backend.set_quota(history_bytes / 2 + 64);
        assert!(store.set(StorageKey::FortuneCount, &12345u64));

        let kept: Vec<serde_json::Value> = store.get(StorageKey::FortuneHistory, Vec::new());
        assert_eq!(kept.len(), 10);
        assert_eq!(kept[0]["message"], "fortune number 0");
        assert_eq!(store.get(StorageKey::FortuneCount, 0u64), 12345);
        assert!(logs_contain("cleared old history items"));
    }

    #[test]
    fn quota_exceeded_twice_reports_failure() {
        let backend = Arc::new(MemoryBackend::with_quota(64));
        let store = store_with(backend);
        let big = "x".repeat(256);
        assert!(!store.set(StorageKey::MessageQueue, &big));
    }

    #[test]
    fn check_version_writes_marker_once() {
        let store = store_with(Arc::new(MemoryBackend::new()));
        assert_eq!(store.check_version(), 0);
        assert_eq!(store.get(StorageKey::Version, 0u32), CURRENT_STORAGE_VERSION);
        assert_eq!(store.check_version(), CURRENT_STORAGE_VERSION);
    }
}
