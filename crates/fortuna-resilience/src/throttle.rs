// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Throttle and exponential backoff controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use fortuna_core::{ApiStatus, Clock};
use fortuna_storage::{KeyValueStore, StorageKey};
use tracing::{debug, info, warn};

use crate::state::{ApiCallState, BackoffPolicy};

/// Callback receiving status transitions.
pub type StatusListener = Arc<dyn Fn(ApiStatus) + Send + Sync>;

/// Gatekeeper for remote calls.
///
/// State is reloaded from the store at construction and written back after
/// every change. The lock guarding it is only held for short synchronous
/// sections.
pub struct ThrottleController {
    policy: BackoffPolicy,
    state: Mutex<ApiCallState>,
    dirty: AtomicBool,
    store: Arc<KeyValueStore>,
    clock: Arc<dyn Clock>,
    listener: Mutex<Option<StatusListener>>,
}

impl ThrottleController {
    /// Create a controller, restoring any persisted state.
    pub fn new(policy: BackoffPolicy, store: Arc<KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_ms();
        let state = match store.get::<Option<ApiCallState>>(StorageKey::ApiState, None) {
            Some(saved) => {
                let state = saved.normalized(&policy, now);
                info!(
                    consecutive_failures = state.consecutive_failures,
                    backoff_ms = state.backoff_delay_ms,
                    "loaded api state from storage"
                );
                state
            }
            None => ApiCallState::fresh(&policy, now),
        };

        Self {
            policy,
            state: Mutex::new(state),
            dirty: AtomicBool::new(false),
            store,
            clock,
            listener: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Register the callback that receives status transitions.
    pub fn set_status_listener(&self, listener: StatusListener) {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(listener);
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ApiCallState {
        *self.lock_state()
    }

    /// Current backoff delay, whether or not failures are outstanding.
    pub fn backoff_delay(&self) -> Duration {
        Duration::from_millis(self.lock_state().backoff_delay_ms)
    }

    /// Whether enough time has passed since the last call.
    pub fn can_call_now(&self) -> bool {
        self.time_until_allowed().is_zero()
    }

    /// How long until [`can_call_now`](Self::can_call_now) turns true.
    pub fn time_until_allowed(&self) -> Duration {
        let state = self.state();
        // A clock that stepped back behind the last call counts as no time elapsed.
        let elapsed = self
            .clock
            .now_ms()
            .saturating_sub(state.last_call_ms)
            .max(0) as u64;
        let required = state.required_gap_ms(&self.policy);
        Duration::from_millis(required.saturating_sub(elapsed))
    }

    /// Mark the start of a remote call.
    pub fn record_call_start(&self) {
        let now = self.clock.now_ms();
        self.update(|state| state.last_call_ms = now);
    }

    /// Reset failures and backoff after a successful call.
    pub fn record_success(&self) {
        let floor = self.policy.initial_backoff_ms;
        let recovered = self.update(|state| {
            let was_failing = state.consecutive_failures > 0;
            state.consecutive_failures = 0;
            state.backoff_delay_ms = floor;
            was_failing
        });
        if recovered {
            info!("advice endpoint recovered");
        }
        self.emit(ApiStatus::Healthy);
    }

    /// Count a failure and double the backoff, capped at the ceiling.
    pub fn record_failure(&self) {
        let policy = self.policy;
        let (failures, backoff) = self.update(|state| {
            state.consecutive_failures = state.consecutive_failures.saturating_add(1);
            state.backoff_delay_ms = policy.next_backoff(state.backoff_delay_ms);
            (state.consecutive_failures, state.backoff_delay_ms)
        });
        warn!(
            consecutive_failures = failures,
            backoff_ms = backoff,
            "advice call failed, backing off"
        );
        self.emit(ApiStatus::Degraded);
    }

    /// Whether state changed since the last successful save.
    pub fn has_changes(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Persist the current state. Returns whether the write succeeded.
    ///
    /// The state lock is held through the write so a concurrent update cannot
    /// be overwritten by an older snapshot.
    pub fn save(&self) -> bool {
        let state = self.lock_state();
        let saved = self.store.set(StorageKey::ApiState, &*state);
        if saved {
            self.dirty.store(false, Ordering::SeqCst);
        } else {
            debug!("api state not persisted, will retry on next save");
        }
        saved
    }

    /// Forward a status to the listener, if any.
    pub fn emit(&self, status: ApiStatus) {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(listener) = listener {
            listener(status);
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut ApiCallState) -> R) -> R {
        let result = {
            let mut state = self.lock_state();
            f(&mut state)
        };
        self.dirty.store(true, Ordering::SeqCst);
        self.save();
        result
    }

    fn lock_state(&self) -> MutexGuard<'_, ApiCallState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
