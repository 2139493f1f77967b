// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the storage, queue, and presentation layers.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier assigned by the remote advice service.
///
/// The advice endpoint hands out numeric ids, but nothing downstream relies
/// on that, so string ids are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteId::Number(n) => write!(f, "{n}"),
            RemoteId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RemoteId {
    fn from(value: i64) -> Self {
        RemoteId::Number(value)
    }
}

impl From<&str> for RemoteId {
    fn from(value: &str) -> Self {
        RemoteId::Text(value.to_string())
    }
}

/// A candidate message waiting in the queue, or one that was just served.
///
/// `id == None` marks a built-in message; those are never deduplicated
/// against remote ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: Option<RemoteId>,
    pub message: String,
}

impl QueueItem {
    /// A built-in (hardcoded or filler) message.
    pub fn builtin(message: impl Into<String>) -> Self {
        Self {
            id: None,
            message: message.into(),
        }
    }

    /// A message fetched from the remote service.
    pub fn remote(id: impl Into<RemoteId>, message: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            message: message.into(),
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.id.is_none()
    }
}

/// The six lucky numbers attached to a served fortune.
///
/// Freshly generated sets are unique, within `[1, 99]`, and sorted; sets
/// loaded from storage are taken as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LuckyNumbers(Vec<u8>);

impl LuckyNumbers {
    /// Number of values in a generated set.
    pub const COUNT: usize = 6;
    /// Largest value a lucky number may take.
    pub const MAX: u8 = 99;

    pub fn new(numbers: Vec<u8>) -> Self {
        Self(numbers)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Checks the generation invariants: six distinct values in `[1, 99]`.
    pub fn is_well_formed(&self) -> bool {
        if self.0.len() != Self::COUNT {
            return false;
        }
        if self.0.iter().any(|&n| n == 0 || n > Self::MAX) {
            return false;
        }
        let mut sorted = self.0.clone();
        sorted.sort_unstable();
        sorted.dedup();
        sorted.len() == Self::COUNT
    }
}

impl fmt::Display for LuckyNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

/// One served fortune, newest-first in the history list.
///
/// Field names follow the persisted JSON layout. `isFavorite`, `luckyNumbers`
/// and `id` are optional on load so records written by older versions still
/// parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub message: String,
    /// Epoch milliseconds at which the fortune was served.
    pub timestamp: i64,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub lucky_numbers: LuckyNumbers,
    #[serde(default)]
    pub id: Option<RemoteId>,
}

/// Connectivity status reported toward the presentation layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    /// The last remote call succeeded.
    Healthy,
    /// The last remote call failed; cached messages are being served.
    Degraded,
    /// The host reported that it has no network connectivity.
    Offline,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn remote_id_accepts_numbers_and_strings() {
        let n: RemoteId = serde_json::from_str("42").unwrap();
        assert_eq!(n, RemoteId::Number(42));
        let s: RemoteId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(s, RemoteId::Text("abc".into()));
        assert_eq!(serde_json::to_string(&n).unwrap(), "42");
        assert_eq!(n.to_string(), "42");
    }

    #[test]
    fn queue_item_builtin_has_no_id() {
        let item = QueueItem::builtin("hello");
        assert!(item.is_builtin());
        assert!(!QueueItem::remote(7, "hi").is_builtin());
    }

    #[test]
    fn history_entry_uses_camel_case_layout() {
        let entry = HistoryEntry {
            message: "m".into(),
            timestamp: 1_700_000_000_000,
            is_favorite: true,
            lucky_numbers: LuckyNumbers::new(vec![1, 2, 3, 4, 5, 6]),
            id: Some(RemoteId::Number(9)),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["isFavorite"], true);
        assert_eq!(json["luckyNumbers"][5], 6);
        assert_eq!(json["id"], 9);
    }

    #[test]
    fn history_entry_defaults_missing_fields() {
        let entry: HistoryEntry =
            serde_json::from_str(r#"{"message":"old","timestamp":5}"#).unwrap();
        assert!(!entry.is_favorite);
        assert!(entry.id.is_none());
        assert!(entry.lucky_numbers.as_slice().is_empty());
    }

    #[test]
    fn lucky_numbers_well_formedness() {
        assert!(LuckyNumbers::new(vec![3, 14, 15, 92, 65, 35]).is_well_formed());
        assert!(!LuckyNumbers::new(vec![1, 1, 2, 3, 4, 5]).is_well_formed());
        assert!(!LuckyNumbers::new(vec![0, 1, 2, 3, 4, 5]).is_well_formed());
        assert!(!LuckyNumbers::new(vec![1, 2, 3, 4, 5, 100]).is_well_formed());
        assert!(!LuckyNumbers::new(vec![1, 2, 3]).is_well_formed());
        assert_eq!(LuckyNumbers::new(vec![4, 8, 15]).to_string(), "4, 8, 15");
    }

    #[test]
    fn api_status_display_round_trip() {
        for status in [ApiStatus::Healthy, ApiStatus::Degraded, ApiStatus::Offline] {
            let parsed = ApiStatus::from_str(&status.to_string()).expect("should parse back");
            assert_eq!(parsed, status);
        }
        assert_eq!(ApiStatus::Degraded.to_string(), "degraded");
    }
}
