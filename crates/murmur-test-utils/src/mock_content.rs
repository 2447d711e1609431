// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted content classifier for service-level tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use murmur_core::{ContentClassifier, MurmurError, Verdict};

/// A content classifier that returns a fixed verdict or always fails.
pub struct MockContentClassifier {
    response: Option<Verdict>,
    calls: AtomicUsize,
}

impl MockContentClassifier {
    /// Always returns `verdict`.
    pub fn returning(verdict: Verdict) -> Self {
        Self {
            response: Some(verdict),
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

    /// Number of moderate calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentClassifier for MockContentClassifier {
    async fn moderate(&self, _text: &str) -> Result<Verdict, MurmurError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().ok_or_else(|| {
            MurmurError::ClassifierUnavailable("mock content classifier is down".to_string())
        })
    }
}
