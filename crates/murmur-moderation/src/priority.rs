// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic verdict-to-priority rule table.

use murmur_core::moderation::category;
use murmur_core::{Priority, Verdict};

/// Compute review urgency from a verdict.
///
/// Rule table, evaluated top down:
/// - any severe category flagged → critical
/// - hate/harassment/violence flagged, or any score > 0.7 → high
/// - sexual or self-harm flagged, or any score > 0.5 → medium
/// - otherwise → low
pub fn priority(verdict: &Verdict) -> Priority {
    if category::SEVERE.iter().any(|c| verdict.is_flagged(c)) {
        return Priority::Critical;
    }
    if verdict.is_flagged(category::HATE)
        || verdict.is_flagged(category::HARASSMENT)
        || verdict.is_flagged(category::VIOLENCE)
        || verdict.max_score() > 0.7
    {
        return Priority::High;
    }
    if verdict.is_flagged(category::SEXUAL)
        || verdict.is_flagged(category::SELF_HARM)
        || verdict.max_score() > 0.5
    {
        return Priority::Medium;
    }
    Priority::Low
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flagged(cat: &str) -> Verdict {
        let mut v = Verdict::clean();
        v.flagged = true;
        v.categories.insert(cat.to_string(), true);
        v
    }

    fn scored(cat: &str, score: f64) -> Verdict {
        let mut v = Verdict::clean();
        v.flagged = true;
        v.scores.insert(cat.to_string(), score);
        v
    }

    #[test]
    fn every_severe_category_is_critical() {
        for cat in category::SEVERE {
            assert_eq!(priority(&flagged(cat)), Priority::Critical, "{cat}");
        }
    }

    #[test]
    fn hate_harassment_violence_flags_are_high() {
        assert_eq!(priority(&flagged(category::HATE)), Priority::High);
        assert_eq!(priority(&flagged(category::HARASSMENT)), Priority::High);
        assert_eq!(priority(&flagged(category::VIOLENCE)), Priority::High);
    }

    #[test]
    fn score_thresholds_pick_the_tier() {
        assert_eq!(priority(&scored("spam", 0.71)), Priority::High);
        assert_eq!(priority(&scored("spam", 0.6)), Priority::Medium);
        assert_eq!(priority(&scored("spam", 0.5)), Priority::Low);
    }

    #[test]
    fn sexual_and_self_harm_flags_are_medium() {
        assert_eq!(priority(&flagged(category::SEXUAL)), Priority::Medium);
        assert_eq!(priority(&flagged(category::SELF_HARM)), Priority::Medium);
    }

    #[test]
    fn clean_verdict_is_low() {
        assert_eq!(priority(&Verdict::clean()), Priority::Low);
    }
}
