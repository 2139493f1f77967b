// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Fortuna engine.

use thiserror::Error;

/// The primary error type used across all Fortuna crates.
///
/// Public queue and controller operations never surface these to the
/// presentation layer; they collapse them into default values, `bool`s, or
/// `Option`s. The variants exist so internal layers can propagate with `?`
/// and so logs carry a precise cause.
#[derive(Debug, Error)]
pub enum FortunaError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database failure, serialization, corrupt entry).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A write would exceed the storage medium's size limit.
    #[error("storage quota exceeded while writing `{key}`")]
    QuotaExceeded { key: String },

    /// The storage medium failed its availability probe.
    #[error("storage is unavailable")]
    StorageUnavailable,

    /// Remote advice endpoint errors (network failure, non-success status).
    #[error("advice error: {message}")]
    Advice {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote endpoint answered with a body we could not interpret.
    #[error("malformed advice payload: {0}")]
    MalformedPayload(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FortunaError {
    /// Returns true if this error is a quota-exceeded write failure.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, FortunaError::QuotaExceeded { .. })
    }
}
