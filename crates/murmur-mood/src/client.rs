// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the external mood classification service.
//!
//! The payload shape is deserialized into a local wire struct and clamped
//! into a [`MoodVector`] at this boundary; loosely-typed JSON never flows
//! further into the system.

use std::time::Duration;

use async_trait::async_trait;
use murmur_core::{MoodClassifier, MoodVector, MurmurError};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Wire shape of a classification response. Missing emotion fields read
/// as 0 rather than failing the whole response.
#[derive(Debug, Deserialize)]
struct WireMood {
    #[serde(default)]
    joy: f64,
    #[serde(default)]
    trust: f64,
    #[serde(default)]
    fear: f64,
    #[serde(default)]
    surprise: f64,
    #[serde(default)]
    sadness: f64,
    #[serde(default)]
    disgust: f64,
    #[serde(default)]
    anger: f64,
    #[serde(default)]
    anticipation: f64,
    #[serde(default)]
    sentiment: f64,
    #[serde(default)]
    intensity: f64,
}

impl From<WireMood> for MoodVector {
    fn from(w: WireMood) -> Self {
        MoodVector {
            joy: w.joy,
            trust: w.trust,
            fear: w.fear,
            surprise: w.surprise,
            sadness: w.sadness,
            disgust: w.disgust,
            anger: w.anger,
            anticipation: w.anticipation,
            sentiment: w.sentiment,
            intensity: w.intensity,
        }
        .clamped()
    }
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

/// HTTP client for mood classification.
///
/// Carries a bounded request timeout and retries once on transient
/// errors (429, 500, 503). Every failure surfaces as
/// [`MurmurError::ClassifierUnavailable`]; the lifecycle service
/// substitutes the neutral vector rather than failing creation.
#[derive(Debug, Clone)]
pub struct HttpMoodClassifier {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl HttpMoodClassifier {
    /// Create a client against `base_url` with the given timeout.
    /// `api_key`, when present, is sent as a bearer token.
    pub fn new(
        base_url: String,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, MurmurError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                MurmurError::ClassifierUnavailable(format!("invalid API key header value: {e}"))
            })?;
            headers.insert("authorization", value);
        }
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                MurmurError::ClassifierUnavailable(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/mood", self.base_url)
    }
}

#[async_trait]
impl MoodClassifier for HttpMoodClassifier {
    async fn classify(&self, text: &str) -> Result<MoodVector, MurmurError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying mood classification after transient error");
                tokio::time::sleep(Duration::from_millis(200)).await;
            }

            let response = self
                .client
                .post(self.endpoint())
                .json(&ClassifyRequest { text })
                .send()
                .await
                .map_err(|e| {
                    MurmurError::ClassifierUnavailable(format!("mood request failed: {e}"))
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "mood classification response");

            if status.is_success() {
                let wire: WireMood = response.json().await.map_err(|e| {
                    MurmurError::ClassifierUnavailable(format!(
                        "mood response malformed: {e}"
                    ))
                })?;
                return Ok(MoodVector::from(wire));
            }

            if is_transient_error(status) && attempt < self.max_retries {
                last_error = Some(MurmurError::ClassifierUnavailable(format!(
                    "mood service returned {status}"
                )));
                continue;
            }

            return Err(MurmurError::ClassifierUnavailable(format!(
                "mood service returned {status}"
            )));
        }

        Err(last_error.unwrap_or_else(|| {
            MurmurError::ClassifierUnavailable("mood classification failed after retries".into())
        }))
    }
}

/// Transient statuses worth one retry.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn classifier(server: &MockServer) -> HttpMoodClassifier {
        HttpMoodClassifier::new(server.uri(), Some("test-key"), Duration::from_millis(500))
            .unwrap()
    }

    #[tokio::test]
    async fn parses_and_clamps_a_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/mood"))
            .and(body_json(json!({"text": "what a morning"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "joy": 1.4,
                "trust": 0.6,
                "sentiment": 0.8,
                "intensity": 0.7
            })))
            .mount(&server)
            .await;

        let mood = classifier(&server).classify("what a morning").await.unwrap();
        assert_eq!(mood.joy, 1.0, "out-of-range values are clamped");
        assert_eq!(mood.trust, 0.6);
        assert_eq!(mood.sentiment, 0.8);
        // Fields absent from the payload read as 0.
        assert_eq!(mood.fear, 0.0);
    }

    #[tokio::test]
    async fn retries_once_on_transient_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/mood"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/mood"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sadness": 0.9, "sentiment": -0.6, "intensity": 0.5
            })))
            .mount(&server)
            .await;

        let mood = classifier(&server).classify("rain again").await.unwrap();
        assert_eq!(mood.sadness, 0.9);
    }

    #[tokio::test]
    async fn persistent_failure_surfaces_classifier_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/mood"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = classifier(&server).classify("hello").await.unwrap_err();
        assert!(matches!(err, MurmurError::ClassifierUnavailable(_)));
    }

    #[tokio::test]
    async fn non_transient_status_fails_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/mood"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let err = classifier(&server).classify("hello").await.unwrap_err();
        assert!(matches!(err, MurmurError::ClassifierUnavailable(_)));
    }

    #[tokio::test]
    async fn malformed_body_surfaces_classifier_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/mood"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = classifier(&server).classify("hello").await.unwrap_err();
        assert!(matches!(err, MurmurError::ClassifierUnavailable(_)));
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/mood"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let err = classifier(&server).classify("hello").await.unwrap_err();
        assert!(matches!(err, MurmurError::ClassifierUnavailable(_)));
    }
}
