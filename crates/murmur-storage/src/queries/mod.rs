// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per table family.

pub mod discoveries;
pub mod emotion_log;
pub mod messages;
pub mod moderation_queue;
pub mod reactions;
pub mod reports;
