// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted controller state and the pacing policy.

use std::time::Duration;

use fortuna_config::model::AdviceConfig;
use serde::{Deserialize, Serialize};

/// Pacing parameters, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Spacing between calls while no failures are outstanding.
    pub throttle_ms: u64,
    /// Backoff floor, restored on success.
    pub initial_backoff_ms: u64,
    /// Backoff ceiling.
    pub max_backoff_ms: u64,
}

impl BackoffPolicy {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Longest a caller ever has to wait for the next permitted call.
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.throttle_ms.max(self.max_backoff_ms))
    }

    /// The delay that follows `current` after one more failure.
    pub fn next_backoff(&self, current_ms: u64) -> u64 {
        current_ms.saturating_mul(2).min(self.max_backoff_ms)
    }
}

impl From<&AdviceConfig> for BackoffPolicy {
    fn from(config: &AdviceConfig) -> Self {
        Self {
            throttle_ms: config.throttle_ms,
            initial_backoff_ms: config.initial_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
        }
    }
}

/// Timestamps and counters that gate remote calls.
///
/// Serialized with the field names of the persisted layout. Missing or zero
/// fields are replaced with policy defaults on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCallState {
    /// Epoch milliseconds of the most recent call start.
    #[serde(rename = "lastApiCall", default)]
    pub last_call_ms: i64,
    #[serde(rename = "consecutiveFailures", default)]
    pub consecutive_failures: u32,
    #[serde(rename = "backoffDelay", default)]
    pub backoff_delay_ms: u64,
}

impl ApiCallState {
    /// Fresh state whose first call is permitted at `now_ms`.
    pub fn fresh(policy: &BackoffPolicy, now_ms: i64) -> Self {
        Self {
            last_call_ms: now_ms.saturating_sub(policy.throttle_ms as i64),
            consecutive_failures: 0,
            backoff_delay_ms: policy.initial_backoff_ms,
        }
    }

    /// Replace zero fields of a loaded state with fresh defaults.
    ///
    /// A last call stamped after `now_ms` is treated as having happened now,
    /// and a backoff above the ceiling is capped.
    pub fn normalized(self, policy: &BackoffPolicy, now_ms: i64) -> Self {
        let fresh = Self::fresh(policy, now_ms);
        Self {
            last_call_ms: match self.last_call_ms {
                0 => fresh.last_call_ms,
                ms if ms > now_ms => now_ms,
                ms => ms,
            },
            consecutive_failures: self.consecutive_failures,
            backoff_delay_ms: match self.backoff_delay_ms {
                0 => fresh.backoff_delay_ms,
                ms => ms.min(policy.max_backoff_ms),
            },
        }
    }

    /// Spacing currently required since the last call.
    pub fn required_gap_ms(&self, policy: &BackoffPolicy) -> u64 {
        if self.consecutive_failures > 0 {
            self.backoff_delay_ms
        } else {
            policy.throttle_ms
        }
    }
}
