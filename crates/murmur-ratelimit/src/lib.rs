// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-(subject, action) fixed-window rate limiting.
//!
//! The limiter is an explicit object injected into the services that need
//! it, not a process-global. Counters live in a [`DashMap`]; each check
//! holds the entry lock for the whole increment-and-compare, so concurrent
//! callers on the same key never lose updates. Windows reset lazily on the
//! first check after their reset time; [`RateLimiter::prune`] drops stale
//! entries on the sweeper's cadence.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    /// Time until the current window resets; `None` when allowed.
    pub retry_after: Option<Duration>,
}

#[derive(Debug)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window counter keyed by `(subject, action)`.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<(String, String), Window>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and count one call for `(subject, action)`.
    ///
    /// Side-effecting: an allowed check consumes one slot in the current
    /// window. A denied check consumes nothing and reports the time until
    /// the window resets.
    pub fn check(
        &self,
        subject: &str,
        action: &str,
        limit: u32,
        window: Duration,
    ) -> Decision {
        self.check_at(subject, action, limit, window, Instant::now())
    }

    /// [`RateLimiter::check`] against an explicit clock, for tests.
    pub fn check_at(
        &self,
        subject: &str,
        action: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> Decision {
        let key = (subject.to_string(), action.to_string());
        // The entry guard is held for the whole increment-and-compare:
        // one logical step per key.
        let mut entry = self.windows.entry(key).or_insert_with(|| Window {
            count: 0,
            reset_at: now + window,
        });
        let w = entry.value_mut();

        // Lazy reset: the first check past the reset time starts a fresh
        // window. Nothing sweeps these eagerly.
        if now >= w.reset_at {
            w.count = 0;
            w.reset_at = now + window;
        }

        if w.count < limit {
            w.count += 1;
            Decision {
                allowed: true,
                retry_after: None,
            }
        } else {
            let retry_after = w.reset_at.saturating_duration_since(now);
            debug!(subject, action, ?retry_after, "rate limit exceeded");
            Decision {
                allowed: false,
                retry_after: Some(retry_after),
            }
        }
    }

    /// Drop windows whose reset time has passed. Called opportunistically
    /// alongside the expiration sweep; correctness never depends on it.
    pub fn prune(&self) {
        self.prune_at(Instant::now());
    }

    /// [`RateLimiter::prune`] against an explicit clock, for tests.
    pub fn prune_at(&self, now: Instant) {
        self.windows.retain(|_, w| w.reset_at > now);
    }

    /// Number of live windows (for tests and diagnostics).
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }
}
