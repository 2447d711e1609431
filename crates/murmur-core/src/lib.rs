// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Murmur message engine.
//!
//! This crate provides the error taxonomy, domain types (messages, mood
//! vectors, moderation verdicts, reports), and the collaborator traits
//! implemented by the classifier adapter crates.

pub mod error;
pub mod geo;
pub mod message;
pub mod moderation;
pub mod mood;
pub mod traits;

// Re-export key items at crate root for ergonomic imports.
pub use error::MurmurError;
pub use geo::GeoPoint;
pub use message::{Message, ModerationStatus, ReactionKind, validate_content};
pub use moderation::{
    ModerationRecord, Priority, QueueStatus, Report, ReportReason, ReportStatus,
    ReviewDecision, Verdict,
};
pub use mood::{Emotion, MoodVector};
pub use traits::{ContentClassifier, MoodClassifier};
