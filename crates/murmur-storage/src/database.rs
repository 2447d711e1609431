// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use chrono::{DateTime, Utc};
use murmur_core::MurmurError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite error into `MurmurError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> MurmurError {
    MurmurError::Storage {
        source: Box::new(e),
    }
}

/// Timestamp format stored in every TEXT timestamp column. Matches
/// SQLite's `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`, so Rust-written and
/// SQL-written values compare correctly as text.
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse a stored timestamp back into `DateTime<Utc>`.
pub fn parse_ts(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Handle to the SQLite database backing the message store.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, MurmurError> {
        let conn = Connection::open(path).await.map_err(MurmurError::storage)?;
        Self::initialize(conn, path).await
    }

    /// Open an in-memory database. Used by tests.
    pub async fn open_in_memory() -> Result<Self, MurmurError> {
        let conn = Connection::open_in_memory().await.map_err(MurmurError::storage)?;
        Self::initialize(conn, ":memory:").await
    }

    async fn initialize(conn: Connection, path: &str) -> Result<Self, MurmurError> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        // Refinery errors are not rusqlite errors, so the closure returns
        // the migration result as its value.
        conn.call(|conn| Ok(migrations::run_migrations(conn)))
            .await
            .map_err(map_tr_err)??;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the database, flushing pending work on the background thread.
    pub async fn close(&self) -> Result<(), MurmurError> {
        self.conn.clone().close().await.map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_runs_migrations_and_creates_tables() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok::<_, rusqlite::Error>(names)
            })
            .await
            .unwrap();

        for expected in [
            "messages",
            "discoveries",
            "reactions",
            "moderation_queue",
            "reports",
            "emotion_log",
        ] {
            assert!(
                tables.iter().any(|t| t == expected),
                "missing table {expected}, got {tables:?}"
            );
        }
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
        // Second open must not fail on already-applied migrations.
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }

    #[test]
    fn timestamp_round_trips_and_sorts_as_text() {
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::milliseconds(1500);
        let a = format_ts(earlier);
        let b = format_ts(later);
        assert!(a < b, "text ordering must match time ordering");
        assert_eq!(parse_ts(&a).unwrap(), earlier.trunc_subsecs(3));
    }
}
