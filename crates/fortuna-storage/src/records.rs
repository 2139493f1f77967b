// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed decoding of the persisted queue, history, and known-id entries.
//!
//! Arrays are decoded element by element: a malformed element is dropped
//! with a warning instead of discarding the whole entry. A value that is not
//! an array at all decodes to an empty list.

use fortuna_core::{HistoryEntry, QueueItem, RemoteId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::keys::StorageKey;
use crate::store::KeyValueStore;

/// A persisted queue element: the current `{id, message}` object or the
/// legacy bare-string form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum QueueRecord {
    Item(QueueItem),
    Legacy(String),
}

impl From<QueueRecord> for QueueItem {
    fn from(record: QueueRecord) -> Self {
        match record {
            QueueRecord::Item(item) => item,
            QueueRecord::Legacy(message) => QueueItem::builtin(message),
        }
    }
}

/// The persisted queue, with legacy strings migrated to built-in items.
pub fn load_queue(store: &KeyValueStore) -> Vec<QueueItem> {
    decode_array::<QueueRecord>(StorageKey::MessageQueue, store.get_json(StorageKey::MessageQueue))
        .into_iter()
        .map(QueueItem::from)
        .collect()
}

/// The persisted history, newest first, cut to `max_entries`.
pub fn load_history(store: &KeyValueStore, max_entries: usize) -> Vec<HistoryEntry> {
    let mut history = decode_array::<HistoryEntry>(
        StorageKey::FortuneHistory,
        store.get_json(StorageKey::FortuneHistory),
    );
    history.truncate(max_entries);
    history
}

/// The persisted known-id list, oldest first.
pub fn load_known_ids(store: &KeyValueStore) -> Vec<RemoteId> {
    decode_array(StorageKey::KnownIds, store.get_json(StorageKey::KnownIds))
}

fn decode_array<T: DeserializeOwned>(key: StorageKey, value: Option<Value>) -> Vec<T> {
    match value {
        None => Vec::new(),
        Some(Value::Array(elements)) => {
            let total = elements.len();
            let decoded: Vec<T> = elements
                .into_iter()
                .filter_map(|element| serde_json::from_value(element).ok())
                .collect();
            if decoded.len() < total {
                warn!(
                    key = %key,
                    dropped = total - decoded.len(),
                    "dropped malformed stored elements"
                );
            }
            decoded
        }
        Some(other) => {
            warn!(key = %key, kind = json_kind(&other), "stored entry is not an array, ignoring");
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
