// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted mood classifier for service-level tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use murmur_core::{MoodClassifier, MoodVector, MurmurError};

/// A mood classifier that returns a fixed vector or always fails.
pub struct MockMoodClassifier {
    response: Option<MoodVector>,
    calls: AtomicUsize,
}

impl MockMoodClassifier {
    /// Always returns `mood`.
    pub fn returning(mood: MoodVector) -> Self {
        Self {
            response: Some(mood),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails with `ClassifierUnavailable`, simulating an outage.
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of classify calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MoodClassifier for MockMoodClassifier {
    async fn classify(&self, _text: &str) -> Result<MoodVector, MurmurError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.ok_or_else(|| {
            MurmurError::ClassifierUnavailable("mock mood classifier is down".to_string())
        })
    }
}
