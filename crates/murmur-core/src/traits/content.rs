// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content classifier trait for the external moderation service.

use async_trait::async_trait;

use crate::error::MurmurError;
use crate::moderation::Verdict;

/// External capability that screens content against policy categories.
///
/// Implementations may fail or time out; the moderation engine falls back
/// to the local keyword filter and never propagates these errors.
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    /// Screen text and return a verdict.
    async fn moderate(&self, text: &str) -> Result<Verdict, MurmurError>;
}
