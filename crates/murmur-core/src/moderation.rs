// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moderation verdicts, priorities, queue records, and reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Policy category names shared by the external classifier and the local
/// keyword fallback. Sub-categories use a `parent/child` path.
pub mod category {
    pub const HATE: &str = "hate";
    pub const HATE_THREATENING: &str = "hate/threatening";
    pub const HARASSMENT: &str = "harassment";
    pub const HARASSMENT_THREATENING: &str = "harassment/threatening";
    pub const VIOLENCE: &str = "violence";
    pub const VIOLENCE_THREAT: &str = "violence/threat";
    pub const VIOLENCE_GRAPHIC: &str = "violence/graphic";
    pub const SEXUAL: &str = "sexual";
    pub const SEXUAL_MINORS: &str = "sexual/minors";
    pub const SELF_HARM: &str = "self-harm";
    pub const SELF_HARM_INTENT: &str = "self-harm/intent";

    /// Categories that escalate straight to [`super::Priority::Critical`]
    /// and auto-reject without a human step.
    pub const SEVERE: [&str; 6] = [
        VIOLENCE_THREAT,
        SELF_HARM_INTENT,
        VIOLENCE_GRAPHIC,
        SEXUAL_MINORS,
        HATE_THREATENING,
        HARASSMENT_THREATENING,
    ];
}

/// Classifier output describing which policy categories a piece of
/// content may violate.
///
/// External payloads are deserialized into this shape at the boundary;
/// the local keyword fallback produces the same shape with all scores 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub flagged: bool,
    /// Per-category boolean flags.
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
    /// Per-category confidence scores in [0, 1].
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}

impl Verdict {
    /// A verdict that flags nothing.
    pub fn clean() -> Self {
        Self::default()
    }

    /// Whether the given category is flagged.
    pub fn is_flagged(&self, category: &str) -> bool {
        self.categories.get(category).copied().unwrap_or(false)
    }

    /// The highest score across all categories, 0 when none are present.
    pub fn max_score(&self) -> f64 {
        self.scores
            .values()
            .copied()
            .filter(|s| s.is_finite())
            .fold(0.0, f64::max)
    }
}

/// Review urgency computed from a verdict. Ordered: comparisons and
/// `max()` give the more urgent priority.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// String form for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    /// Parse from the SQLite string form; unknown values read as low.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "medium" => Priority::Medium,
            "high" => Priority::High,
            "critical" => Priority::Critical,
            _ => Priority::Low,
        }
    }
}

/// Queue state of a [`ModerationRecord`] awaiting or past human review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Reviewing,
    Approved,
    Rejected,
}

impl QueueStatus {
    /// String form for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Reviewing => "reviewing",
            QueueStatus::Approved => "approved",
            QueueStatus::Rejected => "rejected",
        }
    }

    /// Parse from the SQLite string form; unknown values read as pending.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "reviewing" => QueueStatus::Reviewing,
            "approved" => QueueStatus::Approved,
            "rejected" => QueueStatus::Rejected,
            _ => QueueStatus::Pending,
        }
    }
}

/// A human reviewer's decision on a queued message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// A queued review item for a flagged message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationRecord {
    pub id: String,
    pub message_id: String,
    pub verdict: Verdict,
    pub priority: Priority,
    pub queue_status: QueueStatus,
    pub reviewer_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a user reported a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ReportReason {
    Spam,
    Harassment,
    HateSpeech,
    Violence,
    SexualContent,
    SelfHarm,
    Other,
}

impl ReportReason {
    /// String form for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportReason::Spam => "spam",
            ReportReason::Harassment => "harassment",
            ReportReason::HateSpeech => "hate-speech",
            ReportReason::Violence => "violence",
            ReportReason::SexualContent => "sexual-content",
            ReportReason::SelfHarm => "self-harm",
            ReportReason::Other => "other",
        }
    }

    /// Parse from the SQLite string form; unknown values read as other.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "spam" => ReportReason::Spam,
            "harassment" => ReportReason::Harassment,
            "hate-speech" => ReportReason::HateSpeech,
            "violence" => ReportReason::Violence,
            "sexual-content" => ReportReason::SexualContent,
            "self-harm" => ReportReason::SelfHarm,
            _ => ReportReason::Other,
        }
    }
}

/// Lifecycle state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Open,
    Resolved,
}

impl ReportStatus {
    /// String form for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Open => "open",
            ReportStatus::Resolved => "resolved",
        }
    }

    /// Parse from the SQLite string form; unknown values read as open.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "resolved" => ReportStatus::Resolved,
            _ => ReportStatus::Open,
        }
    }
}

/// A user-filed report against a message. Created only by user action,
/// never by the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub message_id: String,
    pub reporter_id: String,
    pub reason: ReportReason,
    pub description: Option<String>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
