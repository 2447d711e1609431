// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background purge of expired ephemeral messages and stale history.
//!
//! The sweeper is cleanup, not enforcement: every read path already
//! treats logically-expired messages as absent, so it is safe to run
//! concurrently with reads, on a timer or directly from tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use murmur_config::model::SweeperConfig;
use murmur_core::MurmurError;
use murmur_ratelimit::RateLimiter;
use murmur_storage::Database;
use murmur_storage::queries::{emotion_log, messages};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// What one sweep removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    /// Expired ephemeral messages physically deleted.
    pub messages_removed: usize,
    /// Emotion log entries past the retention window.
    pub emotion_entries_trimmed: usize,
}

/// Schedulable expiration task with an explicit start/stop lifecycle.
pub struct ExpirationSweeper {
    db: Database,
    config: SweeperConfig,
    /// Pruned opportunistically on the same cadence; never required for
    /// limiter correctness.
    limiter: Option<Arc<RateLimiter>>,
}

impl ExpirationSweeper {
    pub fn new(db: Database, config: SweeperConfig) -> Self {
        Self {
            db,
            config,
            limiter: None,
        }
    }

    /// Also prune this limiter's stale windows each cycle.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// One idempotent sweep: delete expired ephemeral messages, trim the
    /// emotion log past retention, prune limiter windows.
    pub async fn sweep(&self) -> Result<SweepStats, MurmurError> {
        let now = Utc::now();
        let messages_removed = messages::delete_expired(&self.db, now).await?;

        let cutoff = now - Duration::days(i64::from(self.config.emotion_log_retention_days));
        let emotion_entries_trimmed = emotion_log::trim_before(&self.db, cutoff).await?;

        if let Some(limiter) = &self.limiter {
            limiter.prune();
        }

        info!(messages_removed, emotion_entries_trimmed, "sweep complete");
        Ok(SweepStats {
            messages_removed,
            emotion_entries_trimmed,
        })
    }

    /// Run sweeps on the configured interval until cancelled. A failed
    /// cycle is logged and retried on the next tick.
    pub async fn run(&self, cancel: CancellationToken) {
        let period = std::time::Duration::from_secs(self.config.interval_secs);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so startup is quiet.
        interval.tick().await;

        info!(interval_secs = self.config.interval_secs, "sweeper started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("sweeper stopped");
                    return;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.sweep().await {
                        warn!(error = %e, "sweep cycle failed");
                    }
                }
            }
        }
    }
}
