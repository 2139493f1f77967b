// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Advice source trait for remote message providers.

use async_trait::async_trait;

use crate::error::FortunaError;
use crate::types::QueueItem;

/// A provider of fresh advice messages.
///
/// Implementations perform exactly one fetch per call and report the raw
/// outcome. Normalizing failures into `None` and feeding the backoff
/// controller is the job of the advice client wrapping the source.
#[async_trait]
pub trait AdviceSource: Send + Sync + 'static {
    /// Returns the human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetches a single advice message.
    async fn fetch(&self) -> Result<QueueItem, FortunaError>;
}
