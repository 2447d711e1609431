// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mood classifier trait for the external emotion-classification service.

use async_trait::async_trait;

use crate::error::MurmurError;
use crate::mood::MoodVector;

/// External capability that computes an emotional fingerprint for text.
///
/// Implementations may fail or time out; callers must substitute
/// [`MoodVector::neutral`] rather than failing message creation.
#[async_trait]
pub trait MoodClassifier: Send + Sync {
    /// Classify text into a mood vector.
    async fn classify(&self, text: &str) -> Result<MoodVector, MurmurError>;
}
