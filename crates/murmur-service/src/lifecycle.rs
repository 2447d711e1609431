// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message lifecycle service: creation, reactions, discovery marking,
//! and reporting. The top-level entry point other components call into.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use murmur_config::model::{LifecycleConfig, LimitsConfig};
use murmur_core::{
    GeoPoint, Message, ModerationStatus, MoodClassifier, MurmurError, Priority, ReactionKind,
    Report, ReportReason, ReportStatus, validate_content,
};
use murmur_moderation::ModerationEngine;
use murmur_mood::MoodOutcome;
use murmur_ratelimit::RateLimiter;
use murmur_storage::Database;
use murmur_storage::queries::{discoveries, emotion_log, messages, reactions, reports};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Expiry horizon bounds in hours. Caller-supplied values are clamped.
const MIN_EXPIRATION_HOURS: u32 = 1;
const MAX_EXPIRATION_HOURS: u32 = 168;

/// Rate limit action keys.
const ACTION_CREATE: &str = "create";
const ACTION_REPORT: &str = "report";

/// Parameters for [`MessageLifecycleService::create_message`].
#[derive(Debug, Clone)]
pub struct CreateMessageParams {
    pub content: String,
    pub latitude: f64,
    pub longitude: f64,
    /// The authenticated author, when known. Required for rate limiting
    /// and the emotion log; stripped from anonymous external views.
    pub author_id: Option<String>,
    pub is_anonymous: bool,
    pub is_ephemeral: bool,
    /// Expiry horizon in hours; defaults from config, clamped to [1, 168].
    pub expiration_hours: Option<u32>,
}

impl CreateMessageParams {
    /// An anonymous, ephemeral message with the default horizon.
    pub fn new(content: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            content: content.into(),
            latitude,
            longitude,
            author_id: None,
            is_anonymous: true,
            is_ephemeral: true,
            expiration_hours: None,
        }
    }
}

/// Result of a creation: the persisted message (redacted view) plus the
/// explicit mood outcome so callers and tests can see a degraded path.
#[derive(Debug, Clone)]
pub struct CreatedMessage {
    pub message: Message,
    pub mood_outcome: MoodOutcome,
}

/// Orchestrates validation, classification, persistence, and the
/// asynchronous moderation hand-off.
pub struct MessageLifecycleService {
    db: Database,
    limiter: Arc<RateLimiter>,
    mood_classifier: Option<Arc<dyn MoodClassifier>>,
    moderation: Arc<ModerationEngine>,
    limits: LimitsConfig,
    lifecycle: LifecycleConfig,
}

impl MessageLifecycleService {
    pub fn new(
        db: Database,
        limiter: Arc<RateLimiter>,
        mood_classifier: Option<Arc<dyn MoodClassifier>>,
        moderation: Arc<ModerationEngine>,
        limits: LimitsConfig,
        lifecycle: LifecycleConfig,
    ) -> Self {
        Self {
            db,
            limiter,
            mood_classifier,
            moderation,
            limits,
            lifecycle,
        }
    }

    /// Create a message.
    ///
    /// Validation and rate limiting reject synchronously before anything
    /// is persisted. Mood classification has a bounded timeout and
    /// degrades to the neutral vector; creation never fails on classifier
    /// unavailability. Moderation runs in a spawned task after the insert
    /// commits, so a fresh message returns as `pending` and becomes
    /// discoverable only once classification approves it.
    pub async fn create_message(
        &self,
        params: CreateMessageParams,
    ) -> Result<CreatedMessage, MurmurError> {
        if let Some(author_id) = &params.author_id {
            let decision = self.limiter.check(
                author_id,
                ACTION_CREATE,
                self.limits.create_limit,
                Duration::from_secs(self.limits.create_window_secs),
            );
            if !decision.allowed {
                return Err(MurmurError::RateLimited {
                    retry_after: decision.retry_after.unwrap_or_default(),
                });
            }
        }

        let content = validate_content(&params.content)?;
        let location = GeoPoint::new(params.latitude, params.longitude)?;

        let mood_outcome = self.classify_mood(&content).await;
        let mood = mood_outcome.mood();

        let now = Utc::now();
        let expires_at = params.is_ephemeral.then(|| {
            let hours = params
                .expiration_hours
                .unwrap_or(self.lifecycle.default_expiration_hours)
                .clamp(MIN_EXPIRATION_HOURS, MAX_EXPIRATION_HOURS);
            now + chrono::Duration::hours(i64::from(hours))
        });

        let message = Message {
            id: Uuid::new_v4().to_string(),
            content: content.clone(),
            location,
            mood,
            author_id: params.author_id.clone(),
            is_anonymous: params.is_anonymous,
            is_ephemeral: params.is_ephemeral,
            expires_at,
            discovered_by: Vec::new(),
            reactions: HashMap::new(),
            moderation_status: ModerationStatus::Pending,
            created_at: now,
        };

        messages::insert_message(&self.db, &message).await?;

        if let Some(author_id) = &params.author_id {
            emotion_log::append(&self.db, &Uuid::new_v4().to_string(), author_id, &mood, now)
                .await?;
        }

        // Classification happens off the create path: no caller waits on
        // it, and no lock spans the external call.
        let moderation = Arc::clone(&self.moderation);
        let message_id = message.id.clone();
        tokio::spawn(async move {
            if let Err(e) = moderation
                .moderate_message(&message_id, &content, Priority::Low)
                .await
            {
                warn!(message_id = %message_id, error = %e, "async moderation failed; message stays pending");
            }
        });

        info!(
            message_id = %message.id,
            fallback_mood = mood_outcome.is_fallback(),
            ephemeral = message.is_ephemeral,
            "message created"
        );
        Ok(CreatedMessage {
            message: message.redacted(),
            mood_outcome,
        })
    }

    /// Set `user_id`'s reaction, replacing any earlier one by the same
    /// user. Returns the updated message.
    pub async fn add_reaction(
        &self,
        message_id: &str,
        user_id: &str,
        kind: ReactionKind,
    ) -> Result<Message, MurmurError> {
        self.approved_live_message(message_id).await?;
        reactions::upsert_reaction(&self.db, message_id, user_id, kind).await?;
        debug!(message_id, user_id, kind = kind.as_str(), "reaction set");
        self.current_state(message_id).await
    }

    /// Record a discovery. Idempotent: re-marking an already-present user
    /// succeeds and returns the current state.
    pub async fn mark_discovered(
        &self,
        message_id: &str,
        user_id: &str,
    ) -> Result<Message, MurmurError> {
        self.approved_live_message(message_id).await?;
        let newly = discoveries::mark_discovered(&self.db, message_id, user_id).await?;
        if newly {
            debug!(message_id, user_id, "discovery recorded");
        }
        self.current_state(message_id).await
    }

    /// File a report and trigger re-classification of the target at high
    /// priority. A human report always escalates past the classifier's
    /// own severity assessment.
    pub async fn report_message(
        &self,
        message_id: &str,
        reporter_id: &str,
        reason: ReportReason,
        description: Option<String>,
    ) -> Result<Report, MurmurError> {
        let decision = self.limiter.check(
            reporter_id,
            ACTION_REPORT,
            self.limits.report_limit,
            Duration::from_secs(self.limits.report_window_secs),
        );
        if !decision.allowed {
            return Err(MurmurError::TooManyReports {
                retry_after: decision.retry_after.unwrap_or_default(),
            });
        }

        if messages::get_message(&self.db, message_id).await?.is_none() {
            return Err(MurmurError::NotFound(message_id.to_string()));
        }

        let now = Utc::now();
        let report = Report {
            id: Uuid::new_v4().to_string(),
            message_id: message_id.to_string(),
            reporter_id: reporter_id.to_string(),
            reason,
            description,
            status: ReportStatus::Open,
            created_at: now,
            updated_at: now,
        };
        reports::insert_report(&self.db, &report).await?;

        let moderation = Arc::clone(&self.moderation);
        let target = message_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = moderation.rerun_for_report(&target).await {
                warn!(message_id = %target, error = %e, "report-triggered re-classification failed");
            }
        });

        info!(message_id, reporter_id, reason = reason.as_str(), "report filed");
        Ok(report)
    }

    /// Account-deletion cleanup: remove every message by an author.
    /// Returns the number removed.
    pub async fn delete_messages_by_author(&self, author_id: &str) -> Result<usize, MurmurError> {
        let removed = messages::delete_by_author(&self.db, author_id).await?;
        info!(author_id, removed, "author messages deleted");
        Ok(removed)
    }

    /// Classify mood with the explicit-fallback return path.
    async fn classify_mood(&self, content: &str) -> MoodOutcome {
        match &self.mood_classifier {
            None => MoodOutcome::fallback("mood classifier disabled"),
            Some(classifier) => match classifier.classify(content).await {
                Ok(mood) => MoodOutcome::Classified(mood.clamped()),
                Err(e) => {
                    warn!(error = %e, "mood classifier failed, substituting neutral vector");
                    MoodOutcome::fallback(e.to_string())
                }
            },
        }
    }

    /// Gate shared by reactions and discovery marking: the message must
    /// exist, be unexpired, and be approved.
    async fn approved_live_message(&self, message_id: &str) -> Result<Message, MurmurError> {
        let msg = messages::get_message(&self.db, message_id)
            .await?
            .ok_or_else(|| MurmurError::NotFound(message_id.to_string()))?;
        if msg.is_expired(Utc::now()) {
            return Err(MurmurError::Expired(message_id.to_string()));
        }
        if msg.moderation_status != ModerationStatus::Approved {
            return Err(MurmurError::NotApproved(message_id.to_string()));
        }
        Ok(msg)
    }

    /// Re-read and redact the message after a mutation.
    async fn current_state(&self, message_id: &str) -> Result<Message, MurmurError> {
        messages::get_message(&self.db, message_id)
            .await?
            .map(Message::redacted)
            .ok_or_else(|| MurmurError::NotFound(message_id.to_string()))
    }
}
