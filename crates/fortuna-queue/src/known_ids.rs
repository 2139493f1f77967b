// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Insertion-ordered set of remote ids with oldest-first eviction.

use fortuna_core::RemoteId;
use indexmap::IndexSet;

/// Remote ids already queued or served, oldest first.
///
/// The set may grow past `max` between saves; [`trim`](Self::trim) evicts
/// the oldest ids down to the bound.
#[derive(Debug, Clone, Default)]
pub struct KnownIdSet {
    ids: IndexSet<RemoteId>,
    max: usize,
}

impl KnownIdSet {
    pub fn new(max: usize) -> Self {
        Self {
            ids: IndexSet::new(),
            max,
        }
    }

    /// Build from a persisted list, keeping its order. Duplicates collapse to
    /// their first position.
    pub fn from_ids(ids: impl IntoIterator<Item = RemoteId>, max: usize) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            max,
        }
    }

    pub fn contains(&self, id: &RemoteId) -> bool {
        self.ids.contains(id)
    }

    /// Record `id` as newest. Returns false if it was already known.
    pub fn insert(&mut self, id: RemoteId) -> bool {
        self.ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Evict the oldest ids until at most `max` remain. Returns how many
    /// were evicted.
    pub fn trim(&mut self) -> usize {
        let excess = self.ids.len().saturating_sub(self.max);
        if excess > 0 {
            self.ids.drain(..excess);
        }
        excess
    }

    /// Ids oldest first, the order they are persisted in.
    pub fn iter(&self) -> impl Iterator<Item = &RemoteId> {
        self.ids.iter()
    }

    pub fn to_vec(&self) -> Vec<RemoteId> {
        self.ids.iter().cloned().collect()
    }
}
