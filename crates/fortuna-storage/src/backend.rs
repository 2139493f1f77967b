// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend trait for raw key-value persistence media.

use fortuna_core::FortunaError;

/// A synchronous, size-limited string key-value medium.
///
/// Backends report faults as errors; a write that would push the medium past
/// its size limit must fail with [`FortunaError::QuotaExceeded`] so the store
/// can attempt recovery.
pub trait KvBackend: Send + Sync + 'static {
    /// Returns the human-readable name of this backend.
    fn name(&self) -> &str;

    /// Reads the raw value stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, FortunaError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), FortunaError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), FortunaError>;
}
