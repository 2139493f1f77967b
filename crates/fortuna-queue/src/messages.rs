// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in message pools.

use fortuna_core::QueueItem;
use rand::seq::SliceRandom;

/// Messages preloaded into every queue. They carry no remote id.
pub const WISDOM: [&str; 10] = [
    "The best time to plant a tree was 20 years ago. The second best time is now.",
    "Your future is created by what you do today, not tomorrow.",
    "The journey of a thousand miles begins with one step.",
    "What lies behind us and what lies before us are tiny matters compared to what lies within us.",
    "Success is not final, failure is not fatal: it is the courage to continue that counts.",
    "The only way to do great work is to love what you do.",
    "Life is what happens to you while you're busy making other plans.",
    "Innovation distinguishes between a leader and a follower.",
    "The only impossible journey is the one you never begin.",
    "Happiness is not something ready-made. It comes from your own actions.",
];

/// Served when the queue is empty.
pub const EMPTY_QUEUE: [&str; 10] = [
    "The fortune spirits are taking a coffee break!",
    "Oops! The crystal ball is buffering...",
    "The wise owl flew away with all the advice!",
    "Fortune machine says: 'Please insert more wisdom'",
    "The magic 8-ball rolled under the couch!",
    "All fortunes have been adopted by loving families",
    "The fortune fairy is stuck in traffic!",
    "Wisdom reserves are running low - miners are on strike!",
    "The prophecy department is closed for lunch",
    "Error 404: Fortune not found (but you're awesome anyway!)",
];

/// The wisdom pool as queue items, in order.
pub fn builtin_items() -> Vec<QueueItem> {
    WISDOM.iter().map(|m| QueueItem::builtin(*m)).collect()
}

/// A random filler message.
pub fn filler() -> QueueItem {
    let message = EMPTY_QUEUE
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(EMPTY_QUEUE[0]);
    QueueItem::builtin(message)
}
