// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user reactions, one per (message, user).

use murmur_core::{MurmurError, ReactionKind};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Set `user_id`'s reaction on `message_id`, replacing any prior one.
/// Last write wins; there is never more than one row per (message, user).
pub async fn upsert_reaction(
    db: &Database,
    message_id: &str,
    user_id: &str,
    kind: ReactionKind,
) -> Result<(), MurmurError> {
    let message_id = message_id.to_string();
    let user_id = user_id.to_string();
    let kind = kind.as_str();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO reactions (message_id, user_id, kind) VALUES (?1, ?2, ?3)
                 ON CONFLICT (message_id, user_id)
                 DO UPDATE SET kind = excluded.kind,
                               reacted_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![message_id, user_id, kind],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All reactions on a message as (user, kind) pairs.
pub async fn reactions_for_message(
    db: &Database,
    message_id: &str,
) -> Result<Vec<(String, ReactionKind)>, MurmurError> {
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT user_id, kind FROM reactions WHERE message_id = ?1")?;
            let rows = stmt
                .query_map(params![message_id], |row| {
                    let user: String = row.get(0)?;
                    let kind: String = row.get(1)?;
                    Ok((user, ReactionKind::from_str_value(&kind)))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}
