// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: HTTP advice source, SQLite store, and the app handlers.

use std::sync::Arc;

use fortuna::FortuneApp;
use fortuna::app::open_store;
use fortuna_advice::HttpAdviceSource;
use fortuna_config::FortunaConfig;
use fortuna_core::{ApiStatus, RemoteId};
use fortuna_storage::KeyValueStore;
use fortuna_test_utils::MockAdviceSource;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(server: &MockServer, db: &std::path::Path, capacity: usize) -> FortunaConfig {
    let mut config = FortunaConfig::default();
    config.advice.api_url = format!("{}/advice", server.uri());
    config.advice.timeout_secs = 5;
    config.advice.throttle_ms = 50;
    config.advice.initial_backoff_ms = 100;
    config.advice.max_backoff_ms = 1000;
    config.queue.capacity = capacity;
    config.storage.database_path = db.join("fortuna.db").display().to_string();
    config
}

async fn mount_slip(server: &MockServer, id: i64, advice: &str) {
    Mock::given(method("GET"))
        .and(path("/advice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"slip": {"id": id, "advice": advice}})),
        )
        .up_to_n_times(1)
        .mount(server)
        .await;
}

fn build(config: &FortunaConfig) -> FortuneApp {
    let store = Arc::new(open_store(config, false));
    let source = Arc::new(HttpAdviceSource::new(&config.advice).unwrap());
    FortuneApp::new(config.clone(), store, source)
}

#[tokio::test]
async fn fill_from_http_and_persist_to_sqlite() {
    let server = MockServer::start().await;
    mount_slip(&server, 1, "Floss daily.").await;
    mount_slip(&server, 2, "Call your mother.").await;
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(&server, dir.path(), 12);

    {
        let app = build(&config);
        let report = app.initialize().await.unwrap();
        assert_eq!(report.added, 2);
        assert_eq!(app.manager().queue_len(), 12);

        let fortune = app.handle_cookie_click();
        assert_eq!(fortune.message, "Call your mother.");
        assert_eq!(fortune.id, Some(RemoteId::from(2)));
        assert_eq!(app.handle_toggle_favorite(0), Some(true));
    }

    let reopened = build(&config);
    let history = reopened.history();
    assert_eq!(history.len(), 1);
    assert!(history[0].is_favorite);
    assert_eq!(reopened.manager().fortune_count(), 1);
    assert_eq!(reopened.manager().queue_snapshot()[0].message, "Floss daily.");
    assert!(reopened.manager().is_known(&RemoteId::from(1)));
    assert!(reopened.manager().is_known(&RemoteId::from(2)));
}

#[tokio::test]
async fn server_errors_degrade_then_recover() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_slip(&server, 9, "Try again.").await;
    let dir = tempfile::tempdir().unwrap();
    let app = build(&fast_config(&server, dir.path(), 11));
    let mut status = app.subscribe_status();

    let report = app.initialize().await.unwrap();
    assert_eq!(report.attempts, 2);
    assert_eq!(report.added, 1);
    assert_eq!(app.status(), ApiStatus::Healthy);
    assert!(status.has_changed().unwrap(), "went through degraded");
    assert_eq!(app.controller().state().consecutive_failures, 0);
}

#[tokio::test]
async fn malformed_payloads_count_as_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"oops\": true}"))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(&server, dir.path(), 11);
    config.queue.attempt_multiplier = 1;
    config.advice.max_backoff_ms = 200;
    let app = build(&config);

    let report = app.initialize().await.unwrap();
    assert_eq!(report.added, 0);
    assert!(app.controller().state().consecutive_failures > 0);
    assert_eq!(app.status(), ApiStatus::Degraded);
    assert_eq!(app.manager().queue_len(), 10);
}

#[tokio::test]
async fn app_keeps_working_without_storage() {
    let app = FortuneApp::new(
        FortunaConfig::default(),
        Arc::new(KeyValueStore::disabled()),
        Arc::new(MockAdviceSource::new()),
    );
    let first = app.handle_cookie_click();
    let second = app.handle_cookie_click();
    assert_ne!(first.message, second.message);
    assert_eq!(second.fortune_count, 2);
    assert!(app.handle_delete(1));
    assert_eq!(app.history()[0].message, second.message);
    assert!(!app.status_report().storage_available);
}
