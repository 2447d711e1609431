// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content moderation for the Murmur message engine.
//!
//! The external classifier adapter, the local keyword fallback, the
//! verdict-to-priority rule table, and the [`ModerationEngine`] state
//! machine that drives message status transitions.

pub mod classifier;
pub mod engine;
pub mod keyword;
pub mod priority;

pub use classifier::HttpContentClassifier;
pub use engine::{ClassificationOutcome, ModerationEngine, VerdictSource};
pub use keyword::KeywordFilter;
pub use priority::priority;
