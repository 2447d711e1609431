// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Murmur message engine.
//!
//! The message store is the single source of truth for moderation status
//! and expiry: every read path filters logically-expired messages, and no
//! caller caches status beyond one request.

pub mod database;
pub mod migrations;
pub mod queries;

pub use database::{Database, format_ts, parse_ts};
