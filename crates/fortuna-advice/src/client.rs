// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result-or-none wrapper that reports call outcomes to the controller.

use std::sync::Arc;

use fortuna_core::{AdviceSource, QueueItem};
use fortuna_resilience::ThrottleController;
use tracing::{debug, warn};

/// Normalizes an [`AdviceSource`] into `Option` results.
///
/// Every outcome is reported to the controller: success resets backoff,
/// any error (network, status, payload, timeout) counts as a failure.
#[derive(Clone)]
pub struct AdviceClient {
    source: Arc<dyn AdviceSource>,
    controller: Arc<ThrottleController>,
}

impl AdviceClient {
    pub fn new(source: Arc<dyn AdviceSource>, controller: Arc<ThrottleController>) -> Self {
        Self { source, controller }
    }

    pub fn controller(&self) -> &Arc<ThrottleController> {
        &self.controller
    }

    /// Fetch one message. Never fails; `None` means the call did not produce
    /// a usable message.
    pub async fn fetch_one(&self) -> Option<QueueItem> {
        match self.source.fetch().await {
            Ok(item) => {
                debug!(source = self.source.name(), id = ?item.id, "fetched advice");
                self.controller.record_success();
                Some(item)
            }
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "advice call failed");
                self.controller.record_failure();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fortuna_core::{FortunaError, ManualClock};
    use fortuna_resilience::BackoffPolicy;
    use fortuna_storage::{KeyValueStore, MemoryBackend};
    use std::sync::Mutex;

    struct Scripted(Mutex<Vec<Result<QueueItem, FortunaError>>>);

    #[async_trait]
    impl AdviceSource for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch(&self) -> Result<QueueItem, FortunaError> {
            self.0.lock().unwrap().remove(0)
        }
    }

    fn client(script: Vec<Result<QueueItem, FortunaError>>) -> AdviceClient {
        let store = Arc::new(KeyValueStore::new(Arc::new(MemoryBackend::new()), 10));
        let policy = BackoffPolicy {
            throttle_ms: 2100,
            initial_backoff_ms: 1000,
            max_backoff_ms: 30_000,
        };
        let controller = Arc::new(ThrottleController::new(
            policy,
            store,
            Arc::new(ManualClock::new(1_000_000)),
        ));
        AdviceClient::new(Arc::new(Scripted(Mutex::new(script))), controller)
    }

    #[tokio::test]
    async fn success_is_passed_through_and_resets_failures() {
        let client = client(vec![
            Err(FortunaError::MalformedPayload("bad".into())),
            Ok(QueueItem::remote(3, "Be kind.")),
        ]);

        assert_eq!(client.fetch_one().await, None);
        assert_eq!(client.controller().state().consecutive_failures, 1);

        assert_eq!(client.fetch_one().await, Some(QueueItem::remote(3, "Be kind.")));
        assert_eq!(client.controller().state().consecutive_failures, 0);
    }

    #[tokio::test]
    async fn every_error_kind_counts_as_failure() {
        let client = client(vec![
            Err(FortunaError::Advice {
                message: "HTTP 500".into(),
                source: None,
            }),
            Err(FortunaError::Timeout {
                duration: std::time::Duration::from_secs(10),
            }),
        ]);
        assert!(client.fetch_one().await.is_none());
        assert!(client.fetch_one().await.is_none());
        let state = client.controller().state();
        assert_eq!(state.consecutive_failures, 2);
        assert_eq!(state.backoff_delay_ms, 4000);
    }
}
