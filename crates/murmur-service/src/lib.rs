// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer for the Murmur message engine: the message lifecycle
//! (create, react, discover, report), proximity discovery, and the
//! expiration sweeper.
//!
//! Every operation is independently invocable from concurrent tasks; the
//! sweeper is the one recurring background task. Services hold `Arc`s to
//! the store, limiter, and classifier adapters (constructor injection).

pub mod discovery;
pub mod lifecycle;
pub mod sweeper;

pub use discovery::{DiscoveryOptions, DiscoveryService, LocationInsights, MoodFilter};
pub use lifecycle::{CreateMessageParams, CreatedMessage, MessageLifecycleService};
pub use sweeper::{ExpirationSweeper, SweepStats};
