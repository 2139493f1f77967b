// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic snapshot of manager and controller state.

use std::sync::Arc;
use std::time::Duration;

use fortuna_resilience::ThrottleController;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::manager::MessageManager;

/// Background task saving state on a fixed period, only when something is
/// dirty. Dropping the handle does not stop the task; call [`stop`](Self::stop).
pub struct AutoSaver {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl AutoSaver {
    /// Spawn the task on the current runtime.
    pub fn spawn(
        manager: Arc<MessageManager>,
        controller: Arc<ThrottleController>,
        period: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        save_if_dirty(&manager, &controller);
                    }
                    _ = token.cancelled() => {
                        debug!("auto-save shutting down");
                        break;
                    }
                }
            }
        });
        Self { cancel, handle }
    }

    /// Cancel the task, wait for it to finish, and run one final save pass.
    pub async fn stop(self, manager: &MessageManager, controller: &ThrottleController) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "auto-save task ended abnormally");
        }
        save_if_dirty(manager, controller);
    }
}

/// Save both components if either has unsaved changes. Returns whether a
/// save ran.
pub fn save_if_dirty(manager: &MessageManager, controller: &ThrottleController) -> bool {
    if !manager.has_changes() && !controller.has_changes() {
        return false;
    }
    let manager_saved = manager.save();
    let controller_saved = controller.save();
    info!(manager_saved, controller_saved, "auto-save completed");
    true
}
