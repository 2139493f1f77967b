// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the cross-field constraints serde cannot express, collecting every
//! violation instead of failing fast.

use crate::diagnostic::ConfigError;
use crate::model::FortunaConfig;

/// Response caching window of the advice endpoint. The throttle interval must
/// be strictly larger or repeated calls return the same slip.
pub const ENDPOINT_CACHE_WINDOW_MS: u64 = 2000;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &FortunaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        fail(format!(
            "app.log_level `{}` is not one of {}",
            config.app.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let url = config.advice.api_url.trim();
    if url.is_empty() {
        fail("advice.api_url must not be empty".to_string());
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        fail(format!("advice.api_url `{url}` must be an http(s) URL"));
    }

    if config.advice.timeout_secs == 0 {
        fail("advice.timeout_secs must be greater than 0".to_string());
    }

    if config.advice.throttle_ms <= ENDPOINT_CACHE_WINDOW_MS {
        fail(format!(
            "advice.throttle_ms must exceed the endpoint cache window of {ENDPOINT_CACHE_WINDOW_MS}ms, got {}",
            config.advice.throttle_ms
        ));
    }

    if config.advice.initial_backoff_ms == 0 {
        fail("advice.initial_backoff_ms must be greater than 0".to_string());
    }

    if config.advice.max_backoff_ms < config.advice.initial_backoff_ms {
        fail(format!(
            "advice.max_backoff_ms ({}) must be at least advice.initial_backoff_ms ({})",
            config.advice.max_backoff_ms, config.advice.initial_backoff_ms
        ));
    }

    if config.queue.capacity == 0 {
        fail("queue.capacity must be greater than 0".to_string());
    }

    if config.queue.attempt_multiplier == 0 {
        fail("queue.attempt_multiplier must be greater than 0".to_string());
    }

    if config.queue.max_history == 0 {
        fail("queue.max_history must be greater than 0".to_string());
    }

    if config.queue.max_known_ids < config.queue.capacity {
        fail(format!(
            "queue.max_known_ids ({}) must be at least queue.capacity ({})",
            config.queue.max_known_ids, config.queue.capacity
        ));
    }

    if config.queue.auto_save_interval_secs == 0 {
        fail("queue.auto_save_interval_secs must be greater than 0".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.storage.quota_recovery_keep > config.queue.max_history {
        fail(format!(
            "storage.quota_recovery_keep ({}) must not exceed queue.max_history ({})",
            config.storage.quota_recovery_keep, config.queue.max_history
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
