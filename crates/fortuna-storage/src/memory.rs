// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementation of the [`KvBackend`] trait.
//!
//! Used for ephemeral sessions and for tests, where it can also simulate a
//! medium that is unavailable or full.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use fortuna_core::FortunaError;

use crate::backend::KvBackend;

/// HashMap-backed key-value medium.
#[derive(Debug)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: AtomicU64,
    available: AtomicBool,
}

impl MemoryBackend {
    /// A working medium with no practical size limit.
    pub fn new() -> Self {
        Self::with_quota(u64::MAX)
    }

    /// A working medium limited to `quota_bytes` of keys plus values.
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: AtomicU64::new(quota_bytes),
            available: AtomicBool::new(true),
        }
    }

    /// A medium on which every operation fails.
    pub fn unavailable() -> Self {
        let backend = Self::new();
        backend.available.store(false, Ordering::SeqCst);
        backend
    }

    /// Change the size limit; existing entries are kept even if over it.
    pub fn set_quota(&self, quota_bytes: u64) {
        self.quota_bytes.store(quota_bytes, Ordering::SeqCst);
    }

    /// Toggle simulated availability.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Raw value under `key`, bypassing availability simulation.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    /// Number of stored entries, bypassing availability simulation.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, FortunaError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(FortunaError::StorageUnavailable);
        }
        self.entries
            .lock()
            .map_err(|_| FortunaError::Internal("memory backend mutex poisoned".into()))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KvBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<String>, FortunaError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), FortunaError> {
        let mut entries = self.entries()?;
        let others: u64 = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum();
        let needed = others.saturating_add((key.len() + value.len()) as u64);
        if needed > self.quota_bytes.load(Ordering::SeqCst) {
            return Err(FortunaError::QuotaExceeded {
                key: key.to_string(),
            });
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), FortunaError> {
        self.entries()?.remove(key);
        Ok(())
    }
}
