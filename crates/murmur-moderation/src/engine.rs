// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The moderation state machine.
//!
//! Per message: `pending --classify:clean--> approved`,
//! `pending --classify:flagged--> pending + queue entry`,
//! `pending --classify:critical--> rejected` (no human step),
//! `queued --human decision--> approved | rejected`.
//! A manual re-run returns the message to `pending` first; a
//! report-triggered re-run does not (see `rerun_for_report`).

use std::sync::Arc;

use chrono::Utc;
use murmur_core::{
    ContentClassifier, Message, ModerationRecord, ModerationStatus, MurmurError, Priority,
    QueueStatus, ReviewDecision, Verdict,
};
use murmur_storage::Database;
use murmur_storage::queries::{messages, moderation_queue, reports};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::keyword::KeywordFilter;
use crate::priority::priority;

/// Which path produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictSource {
    /// The external classification service.
    Classifier,
    /// The local keyword filter, after a classifier failure or with no
    /// classifier configured.
    KeywordFallback,
}

/// A verdict plus the explicit record of where it came from.
#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub verdict: Verdict,
    pub source: VerdictSource,
}

/// Classifies content, assigns priority, and drives status transitions.
///
/// All status writes go through the store; nothing here caches a status
/// beyond the current call.
pub struct ModerationEngine {
    db: Database,
    classifier: Option<Arc<dyn ContentClassifier>>,
    keyword_filter: KeywordFilter,
}

impl ModerationEngine {
    /// `classifier = None` runs everything through the keyword filter.
    pub fn new(db: Database, classifier: Option<Arc<dyn ContentClassifier>>) -> Self {
        Self {
            db,
            classifier,
            keyword_filter: KeywordFilter::new(),
        }
    }

    /// Classify content, degrading to the keyword filter on any external
    /// failure. Never returns an error: availability over accuracy.
    pub async fn classify(&self, content: &str) -> ClassificationOutcome {
        if let Some(classifier) = &self.classifier {
            match classifier.moderate(content).await {
                Ok(verdict) => {
                    return ClassificationOutcome {
                        verdict,
                        source: VerdictSource::Classifier,
                    };
                }
                Err(e) => {
                    warn!(error = %e, "content classifier failed, using keyword fallback");
                }
            }
        }
        ClassificationOutcome {
            verdict: self.keyword_filter.screen(content),
            source: VerdictSource::KeywordFallback,
        }
    }

    /// Classify a message's content and apply the resulting decision,
    /// with `priority_floor` as the minimum urgency. The asynchronous
    /// entry point used after creation and after reports.
    pub async fn moderate_message(
        &self,
        message_id: &str,
        content: &str,
        priority_floor: Priority,
    ) -> Result<ClassificationOutcome, MurmurError> {
        let outcome = self.classify(content).await;
        let priority = priority(&outcome.verdict).max(priority_floor);
        self.apply_decision(message_id, priority, &outcome.verdict)
            .await?;
        Ok(outcome)
    }

    /// Apply a classification decision to a message.
    ///
    /// - critical → rejected immediately, no queue entry;
    /// - flagged otherwise → queue entry, message status untouched;
    /// - clean → approved.
    pub async fn apply_decision(
        &self,
        message_id: &str,
        priority: Priority,
        verdict: &Verdict,
    ) -> Result<(), MurmurError> {
        if priority == Priority::Critical {
            messages::set_moderation_status(&self.db, message_id, ModerationStatus::Rejected)
                .await?;
            info!(message_id, "auto-rejected critical content");
            return Ok(());
        }

        if verdict.flagged {
            let now = Utc::now();
            let record = ModerationRecord {
                id: Uuid::new_v4().to_string(),
                message_id: message_id.to_string(),
                verdict: verdict.clone(),
                priority,
                queue_status: QueueStatus::Pending,
                reviewer_id: None,
                notes: None,
                created_at: now,
                updated_at: now,
            };
            moderation_queue::enqueue(&self.db, &record).await?;
            debug!(message_id, priority = %priority, "queued for human review");
            return Ok(());
        }

        messages::set_moderation_status(&self.db, message_id, ModerationStatus::Approved).await?;
        debug!(message_id, "approved");
        Ok(())
    }

    /// Human review path: set the terminal status, resolve the queue
    /// entry and any open reports, and return the updated message.
    pub async fn review_message(
        &self,
        message_id: &str,
        reviewer_id: &str,
        decision: ReviewDecision,
        notes: Option<&str>,
    ) -> Result<Message, MurmurError> {
        if messages::get_message(&self.db, message_id).await?.is_none() {
            return Err(MurmurError::NotFound(message_id.to_string()));
        }

        let (status, queue_status) = match decision {
            ReviewDecision::Approve => (ModerationStatus::Approved, QueueStatus::Approved),
            ReviewDecision::Reject => (ModerationStatus::Rejected, QueueStatus::Rejected),
        };

        messages::set_moderation_status(&self.db, message_id, status).await?;
        moderation_queue::resolve_for_message(&self.db, message_id, queue_status, reviewer_id, notes)
            .await?;
        reports::resolve_for_message(&self.db, message_id).await?;
        info!(message_id, reviewer_id, status = status.as_str(), "review decision applied");

        messages::get_message(&self.db, message_id)
            .await?
            .ok_or_else(|| MurmurError::NotFound(message_id.to_string()))
    }

    /// Operator-initiated re-classification: return the message to
    /// `pending` first, then classify and apply as usual.
    pub async fn rerun_classification(
        &self,
        message_id: &str,
        priority_floor: Priority,
    ) -> Result<ClassificationOutcome, MurmurError> {
        let msg = messages::get_message(&self.db, message_id)
            .await?
            .ok_or_else(|| MurmurError::NotFound(message_id.to_string()))?;

        messages::set_moderation_status(&self.db, message_id, ModerationStatus::Pending).await?;
        self.moderate_message(message_id, &msg.content, priority_floor)
            .await
    }

    /// Report-triggered re-classification at a `high` floor.
    ///
    /// Unlike a manual re-run, the current status is left in place: an
    /// approved message stays discoverable while the re-review is queued.
    /// A critical verdict still auto-rejects.
    pub async fn rerun_for_report(
        &self,
        message_id: &str,
    ) -> Result<ClassificationOutcome, MurmurError> {
        let msg = messages::get_message(&self.db, message_id)
            .await?
            .ok_or_else(|| MurmurError::NotFound(message_id.to_string()))?;

        let outcome = self.classify(&msg.content).await;
        let priority = priority(&outcome.verdict).max(Priority::High);

        if priority == Priority::Critical {
            return self
                .apply_decision(message_id, priority, &outcome.verdict)
                .await
                .map(|_| outcome);
        }

        // Always queue a review entry for a reported message, flagged or
        // not: a human report escalates past the classifier's own view.
        let now = Utc::now();
        let record = ModerationRecord {
            id: Uuid::new_v4().to_string(),
            message_id: message_id.to_string(),
            verdict: outcome.verdict.clone(),
            priority,
            queue_status: QueueStatus::Pending,
            reviewer_id: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        moderation_queue::enqueue(&self.db, &record).await?;
        debug!(message_id, "reported message queued at high priority");
        Ok(outcome)
    }
}
