// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user discovery records.

use murmur_core::MurmurError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Record that `user_id` discovered `message_id`. Idempotent: re-marking
/// is a no-op and reports `false`.
pub async fn mark_discovered(
    db: &Database,
    message_id: &str,
    user_id: &str,
) -> Result<bool, MurmurError> {
    let message_id = message_id.to_string();
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO discoveries (message_id, user_id) VALUES (?1, ?2)",
                params![message_id, user_id],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// The users who have discovered a message, in discovery order.
pub async fn discoverers(db: &Database, message_id: &str) -> Result<Vec<String>, MurmurError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM discoveries WHERE message_id = ?1 ORDER BY discovered_at",
            )?;
            let users = stmt
                .query_map(params![message_id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(users)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::messages::tests_support::{insert_test_message, setup_db};

    #[tokio::test]
    async fn mark_discovered_is_idempotent() {
        let db = setup_db().await;
        insert_test_message(&db, "m-1").await;

        assert!(mark_discovered(&db, "m-1", "u-1").await.unwrap());
        assert!(!mark_discovered(&db, "m-1", "u-1").await.unwrap());
        assert!(mark_discovered(&db, "m-1", "u-2").await.unwrap());

        let users = discoverers(&db, "m-1").await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users.iter().filter(|u| *u == "u-1").count(), 1);
    }
}
