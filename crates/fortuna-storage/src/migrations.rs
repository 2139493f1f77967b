// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled in and applied on open.
//! These govern the SQLite table layout only; the JSON payload version is
//! tracked separately through [`StorageKey::Version`](crate::StorageKey::Version).

use fortuna_core::FortunaError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), FortunaError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(|e| FortunaError::Storage {
            source: Box::new(e),
        })?;
    Ok(())
}
