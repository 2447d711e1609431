// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Murmur message engine.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all Murmur services and stores.
///
/// Validation variants (`InvalidContent`, `InvalidLocation`) are raised
/// synchronously before anything is persisted. `ClassifierUnavailable` is
/// internal: callers of the lifecycle and moderation services never see it,
/// because classification failures degrade to local fallbacks instead.
#[derive(Debug, Error)]
pub enum MurmurError {
    /// Message content is empty or over the length limit after trimming.
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// Coordinates out of range, or the (0,0) null-island sentinel.
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// Creation rate limit exceeded for this author.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// Reporting rate limit exceeded for this reporter.
    #[error("too many reports, retry after {retry_after:?}")]
    TooManyReports { retry_after: Duration },

    /// The referenced message does not exist.
    #[error("message not found: {0}")]
    NotFound(String),

    /// The referenced ephemeral message is past its expiry.
    #[error("message expired: {0}")]
    Expired(String),

    /// The referenced message has not been approved by moderation.
    #[error("message not approved: {0}")]
    NotApproved(String),

    /// External classifier failed or timed out. Always recovered internally
    /// via a fallback path; never surfaced from a service entry point.
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Opaque backend fault, distinct from input errors: try again later.
    #[error("temporarily unavailable: {0}")]
    Unavailable(String),
}

impl MurmurError {
    /// Wrap a backend error as a `Storage` variant.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MurmurError::Storage {
            source: Box::new(source),
        }
    }

    /// Whether this error is a caller-input problem (as opposed to a
    /// backend fault the caller should retry later).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MurmurError::InvalidContent(_)
                | MurmurError::InvalidLocation(_)
                | MurmurError::NotFound(_)
                | MurmurError::Expired(_)
                | MurmurError::NotApproved(_)
        )
    }
}
