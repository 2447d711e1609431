// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moderation review queue CRUD.

use murmur_core::{ModerationRecord, MurmurError, Priority, QueueStatus, Verdict};
use rusqlite::params;

use crate::database::{Database, format_ts, map_tr_err, parse_ts};

const RECORD_COLUMNS: &str = "id, message_id, verdict, priority, queue_status, \
     reviewer_id, notes, created_at, updated_at";

/// Insert a review queue entry.
pub async fn enqueue(db: &Database, record: &ModerationRecord) -> Result<(), MurmurError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            let verdict_json =
                serde_json::to_string(&record.verdict).map_err(|e| json_err(2, e))?;
            conn.execute(
                "INSERT INTO moderation_queue (id, message_id, verdict, priority,
                     queue_status, reviewer_id, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    record.id,
                    record.message_id,
                    verdict_json,
                    record.priority.as_str(),
                    record.queue_status.as_str(),
                    record.reviewer_id,
                    record.notes,
                    format_ts(record.created_at),
                    format_ts(record.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The newest queue entry for a message, if any.
pub async fn latest_for_message(
    db: &Database,
    message_id: &str,
) -> Result<Option<ModerationRecord>, MurmurError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM moderation_queue
                 WHERE message_id = ?1 ORDER BY created_at DESC LIMIT 1"
            ))?;
            let result = stmt.query_row(params![message_id], row_to_record);
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Count queue entries for a message.
pub async fn count_for_message(db: &Database, message_id: &str) -> Result<usize, MurmurError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM moderation_queue WHERE message_id = ?1",
                params![message_id],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
        .await
        .map_err(map_tr_err)
}

/// Unreviewed entries, most urgent first, then oldest first.
pub async fn list_open(db: &Database, limit: usize) -> Result<Vec<ModerationRecord>, MurmurError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM moderation_queue
                 WHERE queue_status IN ('pending', 'reviewing')
                 ORDER BY CASE priority
                     WHEN 'critical' THEN 0
                     WHEN 'high' THEN 1
                     WHEN 'medium' THEN 2
                     ELSE 3 END,
                     created_at ASC
                 LIMIT ?1"
            ))?;
            let records = stmt
                .query_map(params![limit as i64], row_to_record)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Resolve the open queue entries for a message with a reviewer decision.
/// Returns the number of entries updated.
pub async fn resolve_for_message(
    db: &Database,
    message_id: &str,
    queue_status: QueueStatus,
    reviewer_id: &str,
    notes: Option<&str>,
) -> Result<usize, MurmurError> {
    let message_id = message_id.to_string();
    let queue_status = queue_status.as_str();
    let reviewer_id = reviewer_id.to_string();
    let notes = notes.map(|n| n.to_string());
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE moderation_queue
                 SET queue_status = ?1, reviewer_id = ?2, notes = ?3,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE message_id = ?4 AND queue_status IN ('pending', 'reviewing')",
                params![queue_status, reviewer_id, notes, message_id],
            )?;
            Ok(changed)
        })
        .await
        .map_err(map_tr_err)
}

fn json_err(idx: usize, e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn ts_err(idx: usize, e: chrono::ParseError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ModerationRecord> {
    let verdict_json: String = row.get(2)?;
    let verdict: Verdict = serde_json::from_str(&verdict_json).map_err(|e| json_err(2, e))?;
    let priority: String = row.get(3)?;
    let queue_status: String = row.get(4)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;

    Ok(ModerationRecord {
        id: row.get(0)?,
        message_id: row.get(1)?,
        verdict,
        priority: Priority::from_str_value(&priority),
        queue_status: QueueStatus::from_str_value(&queue_status),
        reviewer_id: row.get(5)?,
        notes: row.get(6)?,
        created_at: parse_ts(&created_at).map_err(|e| ts_err(7, e))?,
        updated_at: parse_ts(&updated_at).map_err(|e| ts_err(8, e))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::messages::tests_support::{insert_test_message, setup_db};
    use chrono::Utc;
    use murmur_core::moderation::category;

    fn make_record(id: &str, message_id: &str, priority: Priority) -> ModerationRecord {
        let mut verdict = Verdict::clean();
        verdict.flagged = true;
        verdict
            .categories
            .insert(category::HARASSMENT.to_string(), true);
        verdict.scores.insert(category::HARASSMENT.to_string(), 0.6);
        ModerationRecord {
            id: id.to_string(),
            message_id: message_id.to_string(),
            verdict,
            priority,
            queue_status: QueueStatus::Pending,
            reviewer_id: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn enqueue_and_fetch_latest() {
        let db = setup_db().await;
        insert_test_message(&db, "m-1").await;

        enqueue(&db, &make_record("q-1", "m-1", Priority::Medium))
            .await
            .unwrap();

        let record = latest_for_message(&db, "m-1").await.unwrap().unwrap();
        assert_eq!(record.id, "q-1");
        assert_eq!(record.priority, Priority::Medium);
        assert_eq!(record.queue_status, QueueStatus::Pending);
        assert!(record.verdict.is_flagged(category::HARASSMENT));

        assert!(latest_for_message(&db, "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_open_orders_by_urgency() {
        let db = setup_db().await;
        insert_test_message(&db, "m-1").await;
        insert_test_message(&db, "m-2").await;
        insert_test_message(&db, "m-3").await;

        enqueue(&db, &make_record("q-low", "m-1", Priority::Low)).await.unwrap();
        enqueue(&db, &make_record("q-high", "m-2", Priority::High)).await.unwrap();
        enqueue(&db, &make_record("q-med", "m-3", Priority::Medium)).await.unwrap();

        let open = list_open(&db, 10).await.unwrap();
        let ids: Vec<_> = open.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["q-high", "q-med", "q-low"]);
    }

    #[tokio::test]
    async fn resolve_updates_open_entries_only() {
        let db = setup_db().await;
        insert_test_message(&db, "m-1").await;
        enqueue(&db, &make_record("q-1", "m-1", Priority::High)).await.unwrap();

        let changed = resolve_for_message(
            &db,
            "m-1",
            QueueStatus::Approved,
            "reviewer-9",
            Some("looks fine in context"),
        )
        .await
        .unwrap();
        assert_eq!(changed, 1);

        let record = latest_for_message(&db, "m-1").await.unwrap().unwrap();
        assert_eq!(record.queue_status, QueueStatus::Approved);
        assert_eq!(record.reviewer_id.as_deref(), Some("reviewer-9"));
        assert_eq!(record.notes.as_deref(), Some("looks fine in context"));

        // Already resolved: nothing further to update.
        let changed = resolve_for_message(&db, "m-1", QueueStatus::Rejected, "reviewer-9", None)
            .await
            .unwrap();
        assert_eq!(changed, 0);
    }
}
