// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Names of every persisted entry.

use strum::{AsRefStr, Display, EnumIter};

/// A persisted entry. Each key is read and written independently as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter)]
pub enum StorageKey {
    /// Ordered sequence of `{id, message}` (legacy: bare strings).
    #[strum(serialize = "fortune_queue")]
    MessageQueue,
    /// Served fortunes, newest first.
    #[strum(serialize = "fortune_history")]
    FortuneHistory,
    /// Integer fortune counter.
    #[strum(serialize = "fortune_count")]
    FortuneCount,
    /// Throttle and backoff controller state.
    #[strum(serialize = "fortune_api_state")]
    ApiState,
    /// Schema version marker.
    #[strum(serialize = "fortune_storage_version")]
    Version,
    /// Presentation preference: show only favorites in the history view.
    #[strum(serialize = "show_favorites_only")]
    ShowFavoritesOnly,
    /// Remote ids already seen, oldest first.
    #[strum(serialize = "fortune_known_ids")]
    KnownIds,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn keys_are_unique_and_stable() {
        let names: Vec<String> = StorageKey::iter().map(|k| k.to_string()).collect();
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
        assert_eq!(StorageKey::MessageQueue.as_ref(), "fortune_queue");
        assert_eq!(StorageKey::KnownIds.as_ref(), "fortune_known_ids");
    }
}
