// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manager state across restarts, storage faults, and auto-save.

use std::sync::Arc;
use std::time::Duration;

use fortuna_core::{QueueItem, RemoteId};
use fortuna_queue::AutoSaver;
use fortuna_queue::messages::WISDOM;
use fortuna_storage::MemoryBackend;
use fortuna_test_utils::{MockAdviceSource, TestHarness};

#[tokio::test(start_paused = true)]
async fn state_survives_restart() {
    let h = TestHarness::builder()
        .with_source(MockAdviceSource::sequential(1, 10))
        .build();
    h.manager.refill().await.unwrap();

    let item = h.manager.serve_next();
    h.manager.record_served(item.message.clone(), None, item.id.clone());
    h.manager.toggle_favorite_at(0);
    h.manager.wait_for_background().await;
    let queue_before = h.manager.queue_snapshot();

    let restarted = h.restart(MockAdviceSource::new());
    let m = &restarted.manager;
    assert_eq!(m.queue_snapshot(), queue_before);
    assert_eq!(m.fortune_count(), 1);
    let history = m.history_snapshot();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message, item.message);
    assert!(history[0].is_favorite);
    assert!(m.is_known(&RemoteId::from(10)));
    assert_eq!(m.known_id_count(), 10);
}

#[tokio::test(start_paused = true)]
async fn known_ids_deduplicate_after_restart() {
    let h = TestHarness::builder()
        .with_source(MockAdviceSource::sequential(1, 3))
        .build();
    h.manager.refill().await.unwrap();
    // Serve everything so the remote items only live on in history.
    for _ in 0..13 {
        let item = h.manager.serve_next();
        h.manager.record_served(item.message, None, item.id);
    }
    h.manager.wait_for_background().await;

    let restarted = h.restart(MockAdviceSource::sequential(1, 3));
    restarted.manager.refill().await.unwrap();
    assert!(
        restarted
            .manager
            .queue_snapshot()
            .iter()
            .all(QueueItem::is_builtin),
        "ids 1..=3 were already served"
    );
}

#[tokio::test(start_paused = true)]
async fn unavailable_storage_degrades_to_session_state() {
    let h = TestHarness::builder()
        .with_backend(Arc::new(MemoryBackend::unavailable()))
        .build();
    assert!(!h.store.is_available());

    let item = h.manager.serve_next();
    assert_eq!(item.message, WISDOM[0]);
    h.manager.record_served(item.message, None, None);
    h.manager.record_served("second", None, None);
    assert!(h.manager.delete_at(1));
    assert_eq!(h.manager.fortune_count(), 1);
    assert_eq!(h.manager.history_snapshot()[0].message, "second");
    assert_eq!(h.manager.queue_len(), 9);
    assert!(h.manager.has_changes());
}

#[tokio::test(start_paused = true)]
async fn auto_saver_flushes_after_transient_write_failures() {
    let h = TestHarness::new();
    let saver = AutoSaver::spawn(
        h.manager.clone(),
        h.controller.clone(),
        Duration::from_secs(30),
    );

    h.backend.set_available(false);
    h.manager.record_served("written later", None, None);
    assert!(h.manager.has_changes());
    h.backend.set_available(true);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(!h.manager.has_changes());
    let stored = h.backend.peek("fortune_history").unwrap();
    assert!(stored.contains("written later"));

    saver.stop(&h.manager, &h.controller).await;
}

#[tokio::test(start_paused = true)]
async fn auto_saver_stop_runs_final_save() {
    let h = TestHarness::new();
    let saver = AutoSaver::spawn(
        h.manager.clone(),
        h.controller.clone(),
        Duration::from_secs(30),
    );

    h.backend.set_available(false);
    h.manager.record_served("pending", None, None);
    h.backend.set_available(true);

    saver.stop(&h.manager, &h.controller).await;
    assert!(!h.manager.has_changes());
    assert_eq!(h.backend.peek("fortune_count").as_deref(), Some("1"));
}
