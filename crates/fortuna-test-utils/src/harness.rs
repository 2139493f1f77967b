// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness assembling the full core over an in-memory store.
//!
//! The clock is a [`SystemClock`], so tests running under a paused tokio
//! runtime control both pacing sleeps and the throttle's notion of "now".

use std::sync::Arc;

use fortuna_advice::AdviceClient;
use fortuna_config::FortunaConfig;
use fortuna_core::{Clock, SystemClock};
use fortuna_queue::MessageManager;
use fortuna_resilience::{BackoffPolicy, ThrottleController};
use fortuna_storage::{KeyValueStore, MemoryBackend};

use crate::mock_source::MockAdviceSource;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: FortunaConfig,
    backend: Option<Arc<MemoryBackend>>,
    source: Option<MockAdviceSource>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: FortunaConfig::default(),
            backend: None,
            source: None,
        }
    }

    /// Use a custom configuration.
    pub fn with_config(mut self, config: FortunaConfig) -> Self {
        self.config = config;
        self
    }

    /// Reuse an existing backend, e.g. to simulate a restart.
    pub fn with_backend(mut self, backend: Arc<MemoryBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use a pre-scripted advice source.
    pub fn with_source(mut self, source: MockAdviceSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Wire store, controller, client and manager.
    pub fn build(self) -> TestHarness {
        let backend = self.backend.unwrap_or_default();
        let store = Arc::new(KeyValueStore::new(
            backend.clone(),
            self.config.storage.quota_recovery_keep,
        ));
        store.check_version();

        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let controller = Arc::new(ThrottleController::new(
            BackoffPolicy::from(&self.config.advice),
            store.clone(),
            clock.clone(),
        ));
        let source = Arc::new(self.source.unwrap_or_default());
        let client = AdviceClient::new(source.clone(), controller.clone());
        let manager = Arc::new(MessageManager::new(
            self.config.queue.clone(),
            store.clone(),
            client,
            clock,
        ));

        TestHarness {
            config: self.config,
            backend,
            store,
            controller,
            source,
            manager,
        }
    }
}

/// A fully wired core for integration tests.
pub struct TestHarness {
    pub config: FortunaConfig,
    pub backend: Arc<MemoryBackend>,
    pub store: Arc<KeyValueStore>,
    pub controller: Arc<ThrottleController>,
    pub source: Arc<MockAdviceSource>,
    pub manager: Arc<MessageManager>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with default config and a source that always fails.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Build a second harness over the same backend, as after a restart.
    pub fn restart(&self, source: MockAdviceSource) -> TestHarness {
        Self::builder()
            .with_config(self.config.clone())
            .with_backend(self.backend.clone())
            .with_source(source)
            .build()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
