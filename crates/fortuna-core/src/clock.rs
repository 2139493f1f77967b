// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wall-clock abstraction in epoch milliseconds.
//!
//! Persisted timestamps are epoch milliseconds, while pacing delays run on
//! tokio's timer. [`SystemClock`] ties the two together by anchoring the wall
//! clock once and advancing it with `tokio::time::Instant`, so a paused tokio
//! clock in tests also freezes the wall clock the throttle sees.

use std::sync::atomic::{AtomicI64, Ordering};

use tokio::time::Instant;

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync + 'static {
    fn now_ms(&self) -> i64;
}

/// Wall clock anchored at construction and advanced by tokio's monotonic clock.
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch_ms_at_anchor: i64,
    anchor: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch_ms_at_anchor: chrono::Utc::now().timestamp_millis(),
            anchor: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.anchor.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.epoch_ms_at_anchor.saturating_add(elapsed)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
