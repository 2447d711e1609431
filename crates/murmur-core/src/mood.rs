// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emotional fingerprint attached to every message.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The eight named emotions of a mood vector.
///
/// The declaration order is the fixed tie-break order for
/// [`MoodVector::dominant_emotion`]: on equal intensities the earlier
/// variant wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Trust,
    Fear,
    Surprise,
    Sadness,
    Disgust,
    Anger,
    Anticipation,
}

impl Emotion {
    /// All emotions in tie-break order.
    pub const ALL: [Emotion; 8] = [
        Emotion::Joy,
        Emotion::Trust,
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Sadness,
        Emotion::Disgust,
        Emotion::Anger,
        Emotion::Anticipation,
    ];
}

/// Immutable emotional fingerprint: eight emotion intensities in [0, 1],
/// an overall `sentiment` in [-1, 1], and an overall `intensity` in [0, 1].
///
/// Serialized as JSON for storage and for the caller boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodVector {
    pub joy: f64,
    pub trust: f64,
    pub fear: f64,
    pub surprise: f64,
    pub sadness: f64,
    pub disgust: f64,
    pub anger: f64,
    pub anticipation: f64,
    pub sentiment: f64,
    pub intensity: f64,
}

impl MoodVector {
    /// The fixed neutral vector substituted when the external mood
    /// classifier is unavailable: mild positive trust/joy, everything
    /// else low, sentiment 0, intensity 0.3.
    pub fn neutral() -> Self {
        Self {
            joy: 0.5,
            trust: 0.5,
            fear: 0.1,
            surprise: 0.1,
            sadness: 0.1,
            disgust: 0.1,
            anger: 0.1,
            anticipation: 0.1,
            sentiment: 0.0,
            intensity: 0.3,
        }
    }

    /// Intensity of a single emotion.
    pub fn emotion(&self, e: Emotion) -> f64 {
        match e {
            Emotion::Joy => self.joy,
            Emotion::Trust => self.trust,
            Emotion::Fear => self.fear,
            Emotion::Surprise => self.surprise,
            Emotion::Sadness => self.sadness,
            Emotion::Disgust => self.disgust,
            Emotion::Anger => self.anger,
            Emotion::Anticipation => self.anticipation,
        }
    }

    /// Argmax over the eight emotions; ties go to the earlier variant in
    /// [`Emotion::ALL`].
    pub fn dominant_emotion(&self) -> Emotion {
        let mut best = Emotion::Joy;
        let mut best_value = self.emotion(best);
        for e in Emotion::ALL {
            let v = self.emotion(e);
            if v > best_value {
                best = e;
                best_value = v;
            }
        }
        best
    }

    /// Clamp every component into its documented range.
    ///
    /// Applied at the external-classifier boundary so out-of-range values
    /// from a third-party payload never reach core logic.
    pub fn clamped(mut self) -> Self {
        for v in [
            &mut self.joy,
            &mut self.trust,
            &mut self.fear,
            &mut self.surprise,
            &mut self.sadness,
            &mut self.disgust,
            &mut self.anger,
            &mut self.anticipation,
        ] {
            *v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        }
        self.sentiment = if self.sentiment.is_finite() {
            self.sentiment.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        self.intensity = if self.intensity.is_finite() {
            self.intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_vector_matches_the_documented_fallback() {
        let n = MoodVector::neutral();
        assert_eq!(n.joy, 0.5);
        assert_eq!(n.trust, 0.5);
        assert_eq!(n.sentiment, 0.0);
        assert_eq!(n.intensity, 0.3);
        assert_eq!(n.anger, 0.1);
    }

    #[test]
    fn dominant_emotion_is_the_argmax() {
        let mut m = MoodVector::neutral();
        m.sadness = 0.9;
        assert_eq!(m.dominant_emotion(), Emotion::Sadness);
    }

    #[test]
    fn dominant_emotion_tie_breaks_by_declaration_order() {
        // joy and trust tie in the neutral vector; joy is declared first.
        assert_eq!(MoodVector::neutral().dominant_emotion(), Emotion::Joy);

        let mut m = MoodVector::neutral();
        m.anger = 0.5;
        m.joy = 0.2;
        m.trust = 0.5;
        // trust and anger tie; trust is declared earlier.
        assert_eq!(m.dominant_emotion(), Emotion::Trust);
    }

    #[test]
    fn clamped_pulls_external_values_into_range() {
        let m = MoodVector {
            joy: 1.7,
            trust: -0.2,
            fear: f64::NAN,
            surprise: 0.3,
            sadness: 0.3,
            disgust: 0.3,
            anger: 0.3,
            anticipation: 0.3,
            sentiment: -3.0,
            intensity: 9.0,
        }
        .clamped();
        assert_eq!(m.joy, 1.0);
        assert_eq!(m.trust, 0.0);
        assert_eq!(m.fear, 0.0);
        assert_eq!(m.sentiment, -1.0);
        assert_eq!(m.intensity, 1.0);
    }

    #[test]
    fn emotion_names_serialize_lowercase() {
        assert_eq!(Emotion::Anticipation.to_string(), "anticipation");
        let parsed: Emotion = "sadness".parse().unwrap();
        assert_eq!(parsed, Emotion::Sadness);
    }

    #[test]
    fn mood_vector_json_round_trips() {
        let m = MoodVector::neutral();
        let json = serde_json::to_string(&m).unwrap();
        let back: MoodVector = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
