// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Fortuna fortune cookie engine.
//!
//! This crate provides the shared data model (queue items, history entries,
//! remote identifiers), the error taxonomy, and the trait seams (advice
//! sources, clocks) that the storage, resilience, advice, and queue crates
//! are built against.

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::FortunaError;
pub use traits::AdviceSource;
pub use types::{ApiStatus, HistoryEntry, LuckyNumbers, QueueItem, RemoteId};
