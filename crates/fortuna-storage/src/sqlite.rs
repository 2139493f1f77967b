// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`KvBackend`] trait.
//!
//! All access goes through one connection behind a mutex. Calls are short
//! and synchronous, so the lock is never held across an await point.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use fortuna_config::model::StorageConfig;
use fortuna_core::FortunaError;
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::backend::KvBackend;
use crate::migrations;

/// Convert a rusqlite error into [`FortunaError::Storage`].
pub(crate) fn map_sql_err(e: rusqlite::Error) -> FortunaError {
    FortunaError::Storage {
        source: Box::new(e),
    }
}

/// SQLite-backed key-value medium with a byte quota.
pub struct SqliteBackend {
    conn: Mutex<rusqlite::Connection>,
    quota_bytes: u64,
}

impl SqliteBackend {
    /// Open (or create) the database file named in `config` and run migrations.
    pub fn open(config: &StorageConfig) -> Result<Self, FortunaError> {
        let path = Path::new(&config.database_path);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| FortunaError::Storage {
                source: Box::new(e),
            })?;
        }
        let conn = rusqlite::Connection::open(path).map_err(map_sql_err)?;
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(map_sql_err)?;
        debug!(journal_mode = %mode, "journal mode set");
        debug!(path = %config.database_path, "opened sqlite key-value store");
        Self::from_connection(conn, config.quota_bytes)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory(quota_bytes: u64) -> Result<Self, FortunaError> {
        let conn = rusqlite::Connection::open_in_memory().map_err(map_sql_err)?;
        Self::from_connection(conn, quota_bytes)
    }

    fn from_connection(
        mut conn: rusqlite::Connection,
        quota_bytes: u64,
    ) -> Result<Self, FortunaError> {
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(map_sql_err)?;
        migrations::run_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            quota_bytes,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, FortunaError> {
        self.conn
            .lock()
            .map_err(|_| FortunaError::Internal("sqlite connection mutex poisoned".into()))
    }

    /// Total bytes currently stored (keys plus values).
    pub fn used_bytes(&self) -> Result<u64, FortunaError> {
        let conn = self.conn()?;
        let used: i64 = conn
            .query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0) FROM kv",
                [],
                |row| row.get(0),
            )
            .map_err(map_sql_err)?;
        Ok(used.max(0) as u64)
    }
}

impl KvBackend for SqliteBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn read(&self, key: &str) -> Result<Option<String>, FortunaError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(map_sql_err)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), FortunaError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(map_sql_err)?;

        let others: i64 = tx
            .query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
                 FROM kv WHERE key != ?1",
                params![key],
                |row| row.get(0),
            )
            .map_err(map_sql_err)?;
        let needed = others.max(0) as u64 + (key.len() + value.len()) as u64;
        if needed > self.quota_bytes {
            return Err(FortunaError::QuotaExceeded {
                key: key.to_string(),
            });
        }

        tx.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![key, value],
        )
        .map_err(map_sql_err)?;
        tx.commit().map_err(map_sql_err)
    }

    fn remove(&self, key: &str) -> Result<(), FortunaError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(map_sql_err)?;
        Ok(())
    }
}
