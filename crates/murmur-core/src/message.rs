// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message (whisper) domain type and its lifecycle enums.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::MurmurError;
use crate::geo::GeoPoint;
use crate::mood::MoodVector;

/// Maximum message length in characters, counted after trimming.
pub const MAX_CONTENT_CHARS: usize = 1000;

/// A reaction a user can leave on a discovered message. Each user holds at
/// most one reaction per message; a later reaction replaces the earlier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Heart,
    Hug,
    Candle,
    Spark,
    Rain,
}

impl ReactionKind {
    /// String form for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Heart => "heart",
            ReactionKind::Hug => "hug",
            ReactionKind::Candle => "candle",
            ReactionKind::Spark => "spark",
            ReactionKind::Rain => "rain",
        }
    }

    /// Parse from the SQLite string form; unknown values fall back to heart.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "hug" => ReactionKind::Hug,
            "candle" => ReactionKind::Candle,
            "spark" => ReactionKind::Spark,
            "rain" => ReactionKind::Rain,
            _ => ReactionKind::Heart,
        }
    }
}

/// Moderation state of a message. Only `Approved` messages are
/// discoverable or eligible for reactions and discovery-marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    /// String form for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }

    /// Parse from the SQLite string form; unknown values read as pending.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "approved" => ModerationStatus::Approved,
            "rejected" => ModerationStatus::Rejected,
            _ => ModerationStatus::Pending,
        }
    }
}

/// An anonymous or attributed, location-anchored text post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// UUID assigned at creation, immutable.
    pub id: String,
    /// Trimmed UTF-8 text, 1..=1000 characters.
    pub content: String,
    /// Anchor coordinates.
    pub location: GeoPoint,
    /// Emotional fingerprint computed at creation.
    pub mood: MoodVector,
    /// Author, when known. Stripped from external views of anonymous posts.
    pub author_id: Option<String>,
    pub is_anonymous: bool,
    pub is_ephemeral: bool,
    /// Expiry instant; present exactly when `is_ephemeral`.
    pub expires_at: Option<DateTime<Utc>>,
    /// Users who have discovered this message. Monotonic, no duplicates.
    pub discovered_by: Vec<String>,
    /// One reaction per user, keyed by user id.
    pub reactions: HashMap<String, ReactionKind>,
    pub moderation_status: ModerationStatus,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether the message is logically gone at `now`. Expired ephemeral
    /// messages must be treated as absent on every read path, purged or not.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match (self.is_ephemeral, self.expires_at) {
            (true, Some(expires_at)) => expires_at <= now,
            _ => false,
        }
    }

    /// External representation: author identity removed for anonymous posts.
    pub fn redacted(mut self) -> Self {
        if self.is_anonymous {
            self.author_id = None;
        }
        self
    }
}

/// Validate and normalize raw message content: trim, then require
/// 1..=[`MAX_CONTENT_CHARS`] characters. Returns the trimmed text.
pub fn validate_content(raw: &str) -> Result<String, MurmurError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MurmurError::InvalidContent(
            "content is empty after trimming".to_string(),
        ));
    }
    let chars = trimmed.chars().count();
    if chars > MAX_CONTENT_CHARS {
        return Err(MurmurError::InvalidContent(format!(
            "content is {chars} characters, limit is {MAX_CONTENT_CHARS}"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_message() -> Message {
        Message {
            id: "m-1".to_string(),
            content: "hello".to_string(),
            location: GeoPoint::new(40.0, -74.0).unwrap(),
            mood: MoodVector::neutral(),
            author_id: Some("u-1".to_string()),
            is_anonymous: true,
            is_ephemeral: true,
            expires_at: Some(Utc::now() + Duration::hours(24)),
            discovered_by: Vec::new(),
            reactions: HashMap::new(),
            moderation_status: ModerationStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn validate_content_trims_and_accepts() {
        assert_eq!(validate_content("  hi there  ").unwrap(), "hi there");
    }

    #[test]
    fn validate_content_rejects_whitespace_only() {
        assert!(matches!(
            validate_content("   \n\t "),
            Err(MurmurError::InvalidContent(_))
        ));
    }

    #[test]
    fn validate_content_counts_characters_not_bytes() {
        // 1000 multibyte characters are exactly at the limit.
        let at_limit = "é".repeat(MAX_CONTENT_CHARS);
        assert!(validate_content(&at_limit).is_ok());
        let over = "é".repeat(MAX_CONTENT_CHARS + 1);
        assert!(validate_content(&over).is_err());
    }

    #[test]
    fn expired_only_when_ephemeral_and_past_expiry() {
        let now = Utc::now();
        let mut msg = base_message();
        assert!(!msg.is_expired(now));

        msg.expires_at = Some(now - Duration::hours(1));
        assert!(msg.is_expired(now));

        msg.is_ephemeral = false;
        msg.expires_at = None;
        assert!(!msg.is_expired(now + Duration::days(10_000)));
    }

    #[test]
    fn redacted_strips_author_for_anonymous_posts() {
        let msg = base_message();
        assert!(msg.clone().redacted().author_id.is_none());

        let mut attributed = base_message();
        attributed.is_anonymous = false;
        assert_eq!(
            attributed.redacted().author_id.as_deref(),
            Some("u-1")
        );
    }

    #[test]
    fn reaction_kind_string_round_trip() {
        for kind in [
            ReactionKind::Heart,
            ReactionKind::Hug,
            ReactionKind::Candle,
            ReactionKind::Spark,
            ReactionKind::Rain,
        ] {
            assert_eq!(ReactionKind::from_str_value(kind.as_str()), kind);
        }
    }

    #[test]
    fn moderation_status_string_round_trip() {
        for status in [
            ModerationStatus::Pending,
            ModerationStatus::Approved,
            ModerationStatus::Rejected,
        ] {
            assert_eq!(ModerationStatus::from_str_value(status.as_str()), status);
        }
        assert_eq!(
            ModerationStatus::from_str_value("garbage"),
            ModerationStatus::Pending
        );
    }
}
