// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-author emotion history, written at message creation for attributed
//! posts and trimmed by the sweeper after the retention window.

use chrono::{DateTime, Utc};
use murmur_core::{MoodVector, MurmurError};
use rusqlite::params;

use crate::database::{Database, format_ts, map_tr_err, parse_ts};

/// Append a mood snapshot for an author.
pub async fn append(
    db: &Database,
    id: &str,
    author_id: &str,
    mood: &MoodVector,
    created_at: DateTime<Utc>,
) -> Result<(), MurmurError> {
    let id = id.to_string();
    let author_id = author_id.to_string();
    let mood = *mood;
    db.connection()
        .call(move |conn| {
            let mood_json = serde_json::to_string(&mood).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;
            conn.execute(
                "INSERT INTO emotion_log (id, author_id, mood, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, author_id, mood_json, format_ts(created_at)],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// An author's mood snapshots, newest first.
pub async fn history_for_author(
    db: &Database,
    author_id: &str,
    limit: usize,
) -> Result<Vec<(MoodVector, DateTime<Utc>)>, MurmurError> {
    let author_id = author_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT mood, created_at FROM emotion_log
                 WHERE author_id = ?1 ORDER BY created_at DESC LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![author_id, limit as i64], |row| {
                    let mood_json: String = row.get(0)?;
                    let created_at: String = row.get(1)?;
                    let mood: MoodVector = serde_json::from_str(&mood_json).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            0,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                    let created_at = parse_ts(&created_at).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            1,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                    Ok((mood, created_at))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete entries older than `cutoff`. Returns the number removed.
pub async fn trim_before(db: &Database, cutoff: DateTime<Utc>) -> Result<usize, MurmurError> {
    let cutoff = format_ts(cutoff);
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM emotion_log WHERE created_at < ?1",
                params![cutoff],
            )?;
            Ok(removed)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::messages::tests_support::setup_db;
    use chrono::Duration;

    #[tokio::test]
    async fn append_and_read_back_newest_first() {
        let db = setup_db().await;
        let now = Utc::now();
        append(&db, "e-1", "u-1", &MoodVector::neutral(), now - Duration::hours(2))
            .await
            .unwrap();
        let mut excited = MoodVector::neutral();
        excited.joy = 0.9;
        append(&db, "e-2", "u-1", &excited, now).await.unwrap();
        append(&db, "e-3", "u-2", &MoodVector::neutral(), now)
            .await
            .unwrap();

        let history = history_for_author(&db, "u-1", 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].0.joy, 0.9);
    }

    #[tokio::test]
    async fn trim_removes_only_entries_past_retention() {
        let db = setup_db().await;
        let now = Utc::now();
        append(&db, "e-old", "u-1", &MoodVector::neutral(), now - Duration::days(400))
            .await
            .unwrap();
        append(&db, "e-new", "u-1", &MoodVector::neutral(), now - Duration::days(10))
            .await
            .unwrap();

        let removed = trim_before(&db, now - Duration::days(365)).await.unwrap();
        assert_eq!(removed, 1);
        let history = history_for_author(&db, "u-1", 10).await.unwrap();
        assert_eq!(history.len(), 1);
    }
}
