// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message queue manager for the Fortuna engine.
//!
//! [`MessageManager`] owns the bounded queue of unseen messages, the bounded
//! history of served fortunes, the fortune counter, and the set of remote ids
//! already seen. Serving is synchronous; refilling from the remote endpoint
//! runs as a tracked background task that callers can await.

pub mod autosave;
pub mod known_ids;
pub mod lucky;
pub mod manager;
pub mod messages;

pub use autosave::AutoSaver;
pub use known_ids::KnownIdSet;
pub use lucky::generate_lucky_numbers;
pub use manager::{HistoryMatch, MessageManager, RefillReport};
