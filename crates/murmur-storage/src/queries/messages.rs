// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD and the geospatial nearby query.

use chrono::{DateTime, Utc};
use murmur_core::{GeoPoint, Message, ModerationStatus, MoodVector, MurmurError, ReactionKind};
use rusqlite::params;
use tracing::debug;

use crate::database::{Database, format_ts, map_tr_err, parse_ts};

/// Filter for [`find_nearby`].
#[derive(Debug, Clone, Copy)]
pub struct NearbyFilter {
    /// Moderation status to match. Discovery uses `Approved`.
    pub status: ModerationStatus,
    /// When false, ephemeral messages past their expiry are excluded.
    /// Non-ephemeral messages always pass.
    pub include_expired: bool,
}

impl Default for NearbyFilter {
    fn default() -> Self {
        Self {
            status: ModerationStatus::Approved,
            include_expired: false,
        }
    }
}

const MESSAGE_COLUMNS: &str = "id, content, latitude, longitude, mood, author_id, \
     is_anonymous, is_ephemeral, expires_at, moderation_status, created_at";

/// Insert a new message. Discoveries and reactions start empty.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), MurmurError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            let mood_json = serde_json::to_string(&msg.mood)
                .map_err(|e| json_err(4, e))?;
            conn.execute(
                "INSERT INTO messages (id, content, latitude, longitude, mood, author_id,
                     is_anonymous, is_ephemeral, expires_at, moderation_status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    msg.id,
                    msg.content,
                    msg.location.latitude,
                    msg.location.longitude,
                    mood_json,
                    msg.author_id,
                    msg.is_anonymous,
                    msg.is_ephemeral,
                    msg.expires_at.map(format_ts),
                    msg.moderation_status.as_str(),
                    format_ts(msg.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a message by ID with its discovery set and reactions loaded.
pub async fn get_message(db: &Database, id: &str) -> Result<Option<Message>, MurmurError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_message);
            let mut msg = match result {
                Ok(msg) => msg,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            load_associations(conn, std::slice::from_mut(&mut msg))?;
            Ok(Some(msg))
        })
        .await
        .map_err(map_tr_err)
}

/// Set a message's moderation status. Returns false when the message
/// does not exist.
pub async fn set_moderation_status(
    db: &Database,
    id: &str,
    status: ModerationStatus,
) -> Result<bool, MurmurError> {
    let id = id.to_string();
    let status = status.as_str();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE messages SET moderation_status = ?1 WHERE id = ?2",
                params![status, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Find messages within `radius_meters` of `center`, newest first.
///
/// A bounding-box prefilter runs on the indexed lat/lon columns; the exact
/// great-circle check happens in Rust on the candidates. Expiry is
/// evaluated against the caller-supplied `now` so reads racing the sweeper
/// already treat logically-expired messages as absent.
pub async fn find_nearby(
    db: &Database,
    center: GeoPoint,
    radius_meters: f64,
    filter: NearbyFilter,
    now: DateTime<Utc>,
) -> Result<Vec<Message>, MurmurError> {
    let (lat_delta, lon_delta) = center.bounding_deltas(radius_meters);
    let lat_min = (center.latitude - lat_delta).max(-90.0);
    let lat_max = (center.latitude + lat_delta).min(90.0);
    let lon_min = center.longitude - lon_delta;
    let lon_max = center.longitude + lon_delta;
    let status = filter.status.as_str();
    let now_str = format_ts(now);

    db.connection()
        .call(move |conn| {
            let mut sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE moderation_status = ? AND latitude BETWEEN ? AND ?"
            );
            let mut args: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
                Box::new(status),
                Box::new(lat_min),
                Box::new(lat_max),
            ];

            // Longitude clause, handling antimeridian wrap. A box wider
            // than the full circle needs no clause at all.
            if lon_delta < 180.0 {
                if lon_min < -180.0 {
                    sql.push_str(" AND (longitude >= ? OR longitude <= ?)");
                    args.push(Box::new(lon_min + 360.0));
                    args.push(Box::new(lon_max));
                } else if lon_max > 180.0 {
                    sql.push_str(" AND (longitude >= ? OR longitude <= ?)");
                    args.push(Box::new(lon_min));
                    args.push(Box::new(lon_max - 360.0));
                } else {
                    sql.push_str(" AND longitude BETWEEN ? AND ?");
                    args.push(Box::new(lon_min));
                    args.push(Box::new(lon_max));
                }
            }

            if !filter.include_expired {
                sql.push_str(" AND (is_ephemeral = 0 OR expires_at > ?)");
                args.push(Box::new(now_str));
            }

            sql.push_str(" ORDER BY created_at DESC");

            let mut stmt = conn.prepare(&sql)?;
            let refs: Vec<&dyn rusqlite::types::ToSql> =
                args.iter().map(|a| a.as_ref()).collect();
            let candidates = stmt
                .query_map(refs.as_slice(), row_to_message)?
                .collect::<Result<Vec<_>, _>>()?;

            let mut matches: Vec<Message> = candidates
                .into_iter()
                .filter(|m| center.distance_meters(&m.location) <= radius_meters)
                .collect();
            debug!(count = matches.len(), "nearby query matched");

            load_associations(conn, &mut matches)?;
            Ok(matches)
        })
        .await
        .map_err(map_tr_err)
}

/// Physically delete all ephemeral messages past their expiry.
/// Returns the number removed. Associated rows cascade.
pub async fn delete_expired(db: &Database, now: DateTime<Utc>) -> Result<usize, MurmurError> {
    let now_str = format_ts(now);
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM messages
                 WHERE is_ephemeral = 1 AND expires_at IS NOT NULL AND expires_at <= ?1",
                params![now_str],
            )?;
            Ok(removed)
        })
        .await
        .map_err(map_tr_err)
}

/// Remove every message by an author (account-deletion cleanup).
/// Returns the number removed.
pub async fn delete_by_author(db: &Database, author_id: &str) -> Result<usize, MurmurError> {
    let author_id = author_id.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM messages WHERE author_id = ?1",
                params![author_id],
            )?;
            Ok(removed)
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

/// Map a base message row. Discoveries and reactions are loaded separately
/// by [`load_associations`].
fn row_to_message(row: &rusqlite::Row) -> rusqlite::Result<Message> {
    let mood_json: String = row.get(4)?;
    let mood: MoodVector = serde_json::from_str(&mood_json).map_err(|e| json_err(4, e))?;
    let expires_at: Option<String> = row.get(8)?;
    let expires_at = expires_at
        .map(|s| parse_ts(&s).map_err(|e| ts_err(8, e)))
        .transpose()?;
    let created_at: String = row.get(10)?;
    let created_at = parse_ts(&created_at).map_err(|e| ts_err(10, e))?;
    let status: String = row.get(9)?;

    Ok(Message {
        id: row.get(0)?,
        content: row.get(1)?,
        location: GeoPoint {
            latitude: row.get(2)?,
            longitude: row.get(3)?,
        },
        mood,
        author_id: row.get(5)?,
        is_anonymous: row.get(6)?,
        is_ephemeral: row.get(7)?,
        expires_at,
        discovered_by: Vec::new(),
        reactions: Default::default(),
        moderation_status: ModerationStatus::from_str_value(&status),
        created_at,
    })
}

/// Fill `discovered_by` and `reactions` for each message in place.
fn load_associations(
    conn: &rusqlite::Connection,
    messages: &mut [Message],
) -> rusqlite::Result<()> {
    let mut disc_stmt = conn.prepare(
        "SELECT user_id FROM discoveries WHERE message_id = ?1 ORDER BY discovered_at",
    )?;
    let mut react_stmt =
        conn.prepare("SELECT user_id, kind FROM reactions WHERE message_id = ?1")?;

    for msg in messages {
        msg.discovered_by = disc_stmt
            .query_map(params![msg.id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let reactions = react_stmt
            .query_map(params![msg.id], |row| {
                let user: String = row.get(0)?;
                let kind: String = row.get(1)?;
                Ok((user, ReactionKind::from_str_value(&kind)))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        msg.reactions = reactions.into_iter().collect();
    }
    Ok(())
}

/// Shared fixtures for the query test modules.
#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;
    use chrono::Duration;
    use std::collections::HashMap;

    pub(crate) async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    /// An approved ephemeral message at the given coordinates.
    pub(crate) fn make_message(id: &str, lat: f64, lon: f64) -> Message {
        Message {
            id: id.to_string(),
            content: format!("whisper {id}"),
            location: GeoPoint::new(lat, lon).unwrap(),
            mood: MoodVector::neutral(),
            author_id: Some("author-1".to_string()),
            is_anonymous: true,
            is_ephemeral: true,
            expires_at: Some(Utc::now() + Duration::hours(24)),
            discovered_by: Vec::new(),
            reactions: HashMap::new(),
            moderation_status: ModerationStatus::Approved,
            created_at: Utc::now(),
        }
    }

    /// Insert an approved message with a fixed location under `id`.
    pub(crate) async fn insert_test_message(db: &Database, id: &str) {
        insert_message(db, &make_message(id, 40.0, -74.0))
            .await
            .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::tests_support::{make_message, setup_db};
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn insert_and_get_round_trips() {
        let db = setup_db().await;
        let msg = make_message("m-1", 40.7128, -74.0060);
        insert_message(&db, &msg).await.unwrap();

        let got = get_message(&db, "m-1").await.unwrap().unwrap();
        assert_eq!(got.id, "m-1");
        assert_eq!(got.content, "whisper m-1");
        assert_eq!(got.location.latitude, 40.7128);
        assert_eq!(got.mood, MoodVector::neutral());
        assert_eq!(got.author_id.as_deref(), Some("author-1"));
        assert!(got.is_ephemeral);
        assert!(got.expires_at.is_some());
        assert_eq!(got.moderation_status, ModerationStatus::Approved);
        assert!(got.discovered_by.is_empty());
        assert!(got.reactions.is_empty());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_none() {
        let db = setup_db().await;
        assert!(get_message(&db, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_ephemeral_message_has_no_expiry() {
        let db = setup_db().await;
        let mut msg = make_message("m-p", 10.0, 10.0);
        msg.is_ephemeral = false;
        msg.expires_at = None;
        insert_message(&db, &msg).await.unwrap();

        let got = get_message(&db, "m-p").await.unwrap().unwrap();
        assert!(!got.is_ephemeral);
        assert!(got.expires_at.is_none());
    }

    #[tokio::test]
    async fn find_nearby_filters_by_radius() {
        let db = setup_db().await;
        // Two points in Manhattan ~1 km apart, one in Los Angeles.
        insert_message(&db, &make_message("near-1", 40.7128, -74.0060))
            .await
            .unwrap();
        insert_message(&db, &make_message("near-2", 40.7200, -74.0100))
            .await
            .unwrap();
        insert_message(&db, &make_message("far", 34.0522, -118.2437))
            .await
            .unwrap();

        let center = GeoPoint::new(40.7128, -74.0060).unwrap();
        let found = find_nearby(&db, center, 2_000.0, NearbyFilter::default(), Utc::now())
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|m| m.id.as_str()).collect();
        assert!(ids.contains(&"near-1"));
        assert!(ids.contains(&"near-2"));
        assert!(!ids.contains(&"far"));
    }

    #[tokio::test]
    async fn find_nearby_excludes_non_matching_status() {
        let db = setup_db().await;
        let mut pending = make_message("pending", 40.7128, -74.0060);
        pending.moderation_status = ModerationStatus::Pending;
        insert_message(&db, &pending).await.unwrap();
        insert_message(&db, &make_message("approved", 40.7128, -74.0061))
            .await
            .unwrap();

        let center = GeoPoint::new(40.7128, -74.0060).unwrap();
        let found = find_nearby(&db, center, 1_000.0, NearbyFilter::default(), Utc::now())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "approved");
    }

    #[tokio::test]
    async fn find_nearby_excludes_logically_expired() {
        let db = setup_db().await;
        let mut expired = make_message("expired", 40.7128, -74.0060);
        expired.expires_at = Some(Utc::now() - Duration::hours(1));
        insert_message(&db, &expired).await.unwrap();

        let mut eternal = make_message("eternal", 40.7128, -74.0061);
        eternal.is_ephemeral = false;
        eternal.expires_at = None;
        eternal.created_at = Utc::now() - Duration::days(900);
        insert_message(&db, &eternal).await.unwrap();

        let center = GeoPoint::new(40.7128, -74.0060).unwrap();
        let found = find_nearby(&db, center, 1_000.0, NearbyFilter::default(), Utc::now())
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|m| m.id.as_str()).collect();
        assert!(!ids.contains(&"expired"), "expired must be absent pre-sweep");
        assert!(ids.contains(&"eternal"), "non-ephemeral always included");

        let with_expired = find_nearby(
            &db,
            center,
            1_000.0,
            NearbyFilter {
                include_expired: true,
                ..NearbyFilter::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(with_expired.len(), 2);
    }

    #[tokio::test]
    async fn find_nearby_orders_newest_first() {
        let db = setup_db().await;
        let mut old = make_message("old", 40.7128, -74.0060);
        old.created_at = Utc::now() - Duration::hours(5);
        let mut new = make_message("new", 40.7128, -74.0061);
        new.created_at = Utc::now();
        insert_message(&db, &old).await.unwrap();
        insert_message(&db, &new).await.unwrap();

        let center = GeoPoint::new(40.7128, -74.0060).unwrap();
        let found = find_nearby(&db, center, 1_000.0, NearbyFilter::default(), Utc::now())
            .await
            .unwrap();
        assert_eq!(found[0].id, "new");
        assert_eq!(found[1].id, "old");
    }

    #[tokio::test]
    async fn find_nearby_handles_antimeridian_wrap() {
        let db = setup_db().await;
        // Either side of the date line near Fiji.
        insert_message(&db, &make_message("west", -17.0, 179.9)).await.unwrap();
        insert_message(&db, &make_message("east", -17.0, -179.9)).await.unwrap();

        let center = GeoPoint::new(-17.0, 179.95).unwrap();
        let found = find_nearby(&db, center, 50_000.0, NearbyFilter::default(), Utc::now())
            .await
            .unwrap();
        assert_eq!(found.len(), 2, "both sides of the wrap must match");
    }

    #[tokio::test]
    async fn delete_expired_spares_non_ephemeral() {
        let db = setup_db().await;
        let mut expired = make_message("gone", 10.0, 10.0);
        expired.expires_at = Some(Utc::now() - Duration::hours(2));
        insert_message(&db, &expired).await.unwrap();

        let mut ancient = make_message("kept", 10.0, 10.1);
        ancient.is_ephemeral = false;
        ancient.expires_at = None;
        ancient.created_at = Utc::now() - Duration::days(3650);
        insert_message(&db, &ancient).await.unwrap();

        let mut fresh = make_message("fresh", 10.0, 10.2);
        fresh.expires_at = Some(Utc::now() + Duration::hours(2));
        insert_message(&db, &fresh).await.unwrap();

        let removed = delete_expired(&db, Utc::now()).await.unwrap();
        assert_eq!(removed, 1);
        assert!(get_message(&db, "gone").await.unwrap().is_none());
        assert!(get_message(&db, "kept").await.unwrap().is_some());
        assert!(get_message(&db, "fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_by_author_removes_all_their_messages() {
        let db = setup_db().await;
        insert_message(&db, &make_message("a-1", 10.0, 10.0)).await.unwrap();
        insert_message(&db, &make_message("a-2", 11.0, 11.0)).await.unwrap();
        let mut other = make_message("b-1", 12.0, 12.0);
        other.author_id = Some("someone-else".to_string());
        insert_message(&db, &other).await.unwrap();

        let removed = delete_by_author(&db, "author-1").await.unwrap();
        assert_eq!(removed, 2);
        assert!(get_message(&db, "b-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn set_moderation_status_reports_missing_rows() {
        let db = setup_db().await;
        insert_message(&db, &make_message("m-1", 10.0, 10.0)).await.unwrap();

        assert!(set_moderation_status(&db, "m-1", ModerationStatus::Rejected)
            .await
            .unwrap());
        let got = get_message(&db, "m-1").await.unwrap().unwrap();
        assert_eq!(got.moderation_status, ModerationStatus::Rejected);

        assert!(!set_moderation_status(&db, "ghost", ModerationStatus::Approved)
            .await
            .unwrap());
    }
}
