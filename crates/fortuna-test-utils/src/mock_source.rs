// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock advice source for deterministic testing.
//!
//! Outcomes are popped from a FIFO queue. When the queue is empty every
//! call fails, which looks like an unreachable endpoint to the caller.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fortuna_core::{AdviceSource, FortunaError, QueueItem};

/// An advice source returning scripted outcomes.
pub struct MockAdviceSource {
    outcomes: Mutex<VecDeque<Result<QueueItem, FortunaError>>>,
    latency: Duration,
    calls: AtomicUsize,
}

impl MockAdviceSource {
    /// A source with no scripted outcomes.
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// A source that returns `items` in order.
    pub fn with_items(items: Vec<QueueItem>) -> Self {
        let source = Self::new();
        for item in items {
            source.push_item(item);
        }
        source
    }

    /// Remote items with ids `first..first + count`.
    pub fn sequential(first: i64, count: usize) -> Self {
        Self::with_items(
            (first..)
                .take(count)
                .map(|id| QueueItem::remote(id, format!("Advice number {id}.")))
                .collect(),
        )
    }

    /// Simulated time each fetch takes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push_item(&self, item: QueueItem) {
        self.lock().push_back(Ok(item));
    }

    pub fn push_error(&self, message: &str) {
        self.lock().push_back(Err(FortunaError::Advice {
            message: message.to_string(),
            source: None,
        }));
    }

    /// Number of fetches performed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<QueueItem, FortunaError>>> {
        self.outcomes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for MockAdviceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdviceSource for MockAdviceSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self) -> Result<QueueItem, FortunaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.lock().pop_front();
        next.unwrap_or_else(|| {
            Err(FortunaError::Advice {
                message: "mock source exhausted".into(),
                source: None,
            })
        })
    }
}
