// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proximity discovery: the nearby query with mood and already-seen
//! filtering, and aggregate location insights.

use chrono::{Timelike, Utc};
use murmur_config::model::DiscoveryConfig;
use murmur_core::{Emotion, GeoPoint, Message, ModerationStatus, MoodVector, MurmurError};
use murmur_storage::Database;
use murmur_storage::queries::messages::{self, NearbyFilter};
use tracing::debug;

/// Mood-based post-filter for discovery queries. Bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct MoodFilter {
    pub min_sentiment: Option<f64>,
    pub max_sentiment: Option<f64>,
    /// Accept only messages whose dominant emotion is in this set.
    pub dominant_emotions: Option<Vec<Emotion>>,
}

impl MoodFilter {
    fn accepts(&self, mood: &MoodVector) -> bool {
        if let Some(min) = self.min_sentiment {
            if mood.sentiment < min {
                return false;
            }
        }
        if let Some(max) = self.max_sentiment {
            if mood.sentiment > max {
                return false;
            }
        }
        if let Some(emotions) = &self.dominant_emotions {
            if !emotions.contains(&mood.dominant_emotion()) {
                return false;
            }
        }
        true
    }
}

/// Options for [`DiscoveryService::find_nearby_messages`].
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Result cap; defaults from config, clamped to the hard max.
    pub limit: Option<usize>,
    pub include_expired: bool,
    /// Drop messages this user has already discovered.
    pub exclude_discovered_by: Option<String>,
    pub mood_filter: Option<MoodFilter>,
    /// Privileged callers may query non-approved messages (review
    /// tooling). Everyone else gets `Approved`.
    pub status_override: Option<ModerationStatus>,
}

/// Aggregate view of the messages around a location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationInsights {
    pub message_count: usize,
    pub average_sentiment: f64,
    /// Dominant emotion of the mean mood vector; `None` with no messages.
    pub dominant_emotion: Option<Emotion>,
    /// Top UTC creation-hour buckets as (hour, count), most frequent
    /// first, at most three.
    pub top_hours: Vec<(u32, usize)>,
}

impl LocationInsights {
    /// The well-defined zero state returned when nothing is nearby.
    fn empty() -> Self {
        Self {
            message_count: 0,
            average_sentiment: 0.0,
            dominant_emotion: None,
            top_hours: Vec::new(),
        }
    }
}

/// Read-side orchestration over the message store.
pub struct DiscoveryService {
    db: Database,
    config: DiscoveryConfig,
}

impl DiscoveryService {
    pub fn new(db: Database, config: DiscoveryConfig) -> Self {
        Self { db, config }
    }

    /// Find approved, unexpired messages near a point.
    ///
    /// Validates the location with the same rules as creation, queries the
    /// store, then applies the already-seen and mood post-filters and the
    /// result cap. Results are newest first and redacted.
    pub async fn find_nearby_messages(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        options: DiscoveryOptions,
    ) -> Result<Vec<Message>, MurmurError> {
        let center = GeoPoint::new(latitude, longitude)?;
        let status = options.status_override.unwrap_or(ModerationStatus::Approved);
        let limit = options
            .limit
            .unwrap_or(self.config.default_limit)
            .min(self.config.max_limit);

        let found = messages::find_nearby(
            &self.db,
            center,
            radius_meters,
            NearbyFilter {
                status,
                include_expired: options.include_expired,
            },
            Utc::now(),
        )
        .await?;
        let candidates = found.len();

        let results: Vec<Message> = found
            .into_iter()
            .filter(|m| match &options.exclude_discovered_by {
                Some(user) => !m.discovered_by.iter().any(|u| u == user),
                None => true,
            })
            .filter(|m| match &options.mood_filter {
                Some(filter) => filter.accepts(&m.mood),
                None => true,
            })
            .take(limit)
            .map(Message::redacted)
            .collect();

        debug!(
            candidates,
            returned = results.len(),
            radius_meters,
            "nearby discovery"
        );
        Ok(results)
    }

    /// Aggregate sentiment, dominant emotion, and activity hours for the
    /// approved messages around a point. Returns the zero state when
    /// nothing is found, never an error.
    pub async fn location_insights(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> Result<LocationInsights, MurmurError> {
        let center = GeoPoint::new(latitude, longitude)?;
        let found = messages::find_nearby(
            &self.db,
            center,
            radius_meters,
            NearbyFilter::default(),
            Utc::now(),
        )
        .await?;

        if found.is_empty() {
            return Ok(LocationInsights::empty());
        }

        let count = found.len();
        let n = count as f64;
        let average_sentiment = found.iter().map(|m| m.mood.sentiment).sum::<f64>() / n;

        // Mean mood vector across the set; its argmax is the area's
        // dominant emotion, with the usual tie-break order.
        let mut mean = MoodVector {
            joy: 0.0,
            trust: 0.0,
            fear: 0.0,
            surprise: 0.0,
            sadness: 0.0,
            disgust: 0.0,
            anger: 0.0,
            anticipation: 0.0,
            sentiment: average_sentiment,
            intensity: found.iter().map(|m| m.mood.intensity).sum::<f64>() / n,
        };
        for m in &found {
            mean.joy += m.mood.joy / n;
            mean.trust += m.mood.trust / n;
            mean.fear += m.mood.fear / n;
            mean.surprise += m.mood.surprise / n;
            mean.sadness += m.mood.sadness / n;
            mean.disgust += m.mood.disgust / n;
            mean.anger += m.mood.anger / n;
            mean.anticipation += m.mood.anticipation / n;
        }

        let mut hour_counts = [0usize; 24];
        for m in &found {
            hour_counts[m.created_at.hour() as usize] += 1;
        }
        let mut hours: Vec<(u32, usize)> = hour_counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(h, c)| (h as u32, *c))
            .collect();
        // Most frequent first; earlier hour wins ties for determinism.
        hours.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        hours.truncate(3);

        Ok(LocationInsights {
            message_count: count,
            average_sentiment,
            dominant_emotion: Some(mean.dominant_emotion()),
            top_hours: hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mood(sentiment: f64) -> MoodVector {
        MoodVector {
            sentiment,
            ..MoodVector::neutral()
        }
    }

    #[test]
    fn sentiment_bounds_are_inclusive() {
        let filter = MoodFilter {
            min_sentiment: Some(-0.2),
            max_sentiment: Some(0.5),
            dominant_emotions: None,
        };
        assert!(filter.accepts(&mood(-0.2)));
        assert!(filter.accepts(&mood(0.5)));
        assert!(filter.accepts(&mood(0.0)));
        assert!(!filter.accepts(&mood(-0.21)));
        assert!(!filter.accepts(&mood(0.51)));
    }

    #[test]
    fn dominant_emotion_set_filters() {
        let mut sad = MoodVector::neutral();
        sad.sadness = 0.9;
        let filter = MoodFilter {
            min_sentiment: None,
            max_sentiment: None,
            dominant_emotions: Some(vec![Emotion::Sadness, Emotion::Fear]),
        };
        assert!(filter.accepts(&sad));
        assert!(!filter.accepts(&MoodVector::neutral()), "neutral is joy-dominant");
    }

    #[test]
    fn empty_filter_accepts_everything() {
        let filter = MoodFilter::default();
        assert!(filter.accepts(&mood(-1.0)));
        assert!(filter.accepts(&mood(1.0)));
    }
}
