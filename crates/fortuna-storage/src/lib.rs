// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent key-value store for the Fortuna engine.
//!
//! A small synchronous `get`/`set` facade over a size-limited medium. Every
//! failure (medium unavailable, corrupt entry, quota exceeded) degrades to a
//! default value or `false`; nothing here raises to the caller. Two backends
//! are provided: SQLite (durable, with embedded migrations) and an in-memory
//! map that can simulate an unavailable or full medium.

pub mod backend;
pub mod keys;
pub mod memory;
pub mod migrations;
pub mod records;
pub mod sqlite;
pub mod store;

pub use backend::KvBackend;
pub use keys::StorageKey;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
pub use store::{KeyValueStore, CURRENT_STORAGE_VERSION};
