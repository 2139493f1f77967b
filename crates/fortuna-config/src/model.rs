// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Fortuna engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Fortuna configuration.
///
/// Every section is optional and defaults to the values the engine was
/// tuned with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FortunaConfig {
    /// Process-level settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Remote advice endpoint and throttling.
    #[serde(default)]
    pub advice: AdviceConfig,

    /// Queue, history, and dedup bounds.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Persistent key-value store settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Process-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Remote advice endpoint, throttle interval, and backoff bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdviceConfig {
    /// URL of the advice endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Minimum spacing between calls while healthy. Must stay above the
    /// endpoint's own 2-second response cache.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Backoff floor after the first failure.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl AdviceConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            throttle_ms: default_throttle_ms(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.adviceslip.com/advice".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_throttle_ms() -> u64 {
    2100
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

/// Bounds for the message queue, history, and known-id set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Refill target for the message queue.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Refill attempt budget is `capacity * attempt_multiplier`.
    #[serde(default = "default_attempt_multiplier")]
    pub attempt_multiplier: usize,

    /// Maximum number of history entries kept.
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Maximum number of remote ids remembered for deduplication.
    #[serde(default = "default_max_known_ids")]
    pub max_known_ids: usize,

    /// Period of the dirty-state auto-save timer.
    #[serde(default = "default_auto_save_interval_secs")]
    pub auto_save_interval_secs: u64,
}

impl QueueConfig {
    pub fn max_attempts(&self) -> usize {
        self.capacity.saturating_mul(self.attempt_multiplier)
    }

    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_secs(self.auto_save_interval_secs)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            attempt_multiplier: default_attempt_multiplier(),
            max_history: default_max_history(),
            max_known_ids: default_max_known_ids(),
            auto_save_interval_secs: default_auto_save_interval_secs(),
        }
    }
}

fn default_capacity() -> usize {
    20
}

fn default_attempt_multiplier() -> usize {
    3
}

fn default_max_history() -> usize {
    20
}

fn default_max_known_ids() -> usize {
    1000
}

fn default_auto_save_interval_secs() -> u64 {
    30
}

/// Persistent key-value store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Total size limit for stored keys and values, in bytes.
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: u64,

    /// History entries kept when a write hits the quota.
    #[serde(default = "default_quota_recovery_keep")]
    pub quota_recovery_keep: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            quota_bytes: default_quota_bytes(),
            quota_recovery_keep: default_quota_recovery_keep(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("fortuna").join("fortuna.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("fortuna.db"))
        .display()
        .to_string()
}

fn default_quota_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_quota_recovery_keep() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let config = FortunaConfig::default();
        assert_eq!(config.advice.throttle_ms, 2100);
        assert_eq!(config.advice.initial_backoff_ms, 1000);
        assert_eq!(config.advice.max_backoff_ms, 30_000);
        assert_eq!(config.queue.capacity, 20);
        assert_eq!(config.queue.max_attempts(), 60);
        assert_eq!(config.queue.max_history, 20);
        assert_eq!(config.queue.max_known_ids, 1000);
        assert_eq!(config.storage.quota_recovery_keep, 10);
        assert!(config.storage.database_path.ends_with("fortuna.db"));
    }

    #[test]
    fn duration_helpers() {
        let advice = AdviceConfig::default();
        assert_eq!(advice.throttle(), Duration::from_millis(2100));
        assert_eq!(advice.timeout(), Duration::from_secs(10));
        assert_eq!(
            QueueConfig::default().auto_save_interval(),
            Duration::from_secs(30)
        );
    }
}
