// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Fortuna configuration system.

use fortuna_config::diagnostic::ConfigError;
use fortuna_config::model::FortunaConfig;
use fortuna_config::{load_and_validate_str, load_config_from_path, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_fortuna_config() {
    let toml = r#"
[app]
log_level = "debug"

[advice]
api_url = "http://localhost:9999/advice"
timeout_secs = 3
throttle_ms = 2500
initial_backoff_ms = 500
max_backoff_ms = 8000

[queue]
capacity = 5
attempt_multiplier = 2
max_history = 15
max_known_ids = 50
auto_save_interval_secs = 10

[storage]
database_path = "/tmp/fortuna-test.db"
quota_bytes = 4096
quota_recovery_keep = 5
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should load");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.advice.api_url, "http://localhost:9999/advice");
    assert_eq!(config.advice.throttle_ms, 2500);
    assert_eq!(config.advice.max_backoff_ms, 8000);
    assert_eq!(config.queue.capacity, 5);
    assert_eq!(config.queue.max_attempts(), 10);
    assert_eq!(config.queue.max_history, 15);
    assert_eq!(config.storage.database_path, "/tmp/fortuna-test.db");
    assert_eq!(config.storage.quota_bytes, 4096);
}

/// An empty document yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should load");
    let defaults = FortunaConfig::default();
    assert_eq!(config.queue.capacity, defaults.queue.capacity);
    assert_eq!(config.advice.api_url, defaults.advice.api_url);
}

/// Unknown field in [queue] produces an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_field_in_queue_suggests_correction() {
    let toml = "[queue]\ncapacty = 5\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "capacty");
            assert_eq!(suggestion.as_deref(), Some("capacity"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telemetry]\nenabled = true\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

/// Wrong value type is reported with the dotted key path.
#[test]
fn invalid_type_reports_key_path() {
    let errors = load_and_validate_str("[queue]\ncapacity = \"twenty\"\n").unwrap_err();
    match &errors[0] {
        ConfigError::InvalidType { key, .. } => assert_eq!(key, "queue.capacity"),
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

/// Semantic validation runs after successful deserialization.
#[test]
fn throttle_below_cache_window_fails_validation() {
    let errors = load_and_validate_str("[advice]\nthrottle_ms = 1500\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

/// Environment variables override file values, with section-aware mapping.
#[test]
fn env_vars_override_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            "[advice]\nmax_backoff_ms = 9000\n[queue]\ncapacity = 7\n",
        )?;
        jail.set_env("FORTUNA_ADVICE_MAX_BACKOFF_MS", "12000");
        jail.set_env("FORTUNA_STORAGE_QUOTA_RECOVERY_KEEP", "3");

        let config = load_config_from_path(std::path::Path::new("custom.toml"))
            .expect("config should load");
        assert_eq!(config.advice.max_backoff_ms, 12000);
        assert_eq!(config.queue.capacity, 7);
        assert_eq!(config.storage.quota_recovery_keep, 3);
        Ok(())
    });
}
