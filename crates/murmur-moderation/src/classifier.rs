// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the external content classification service.

use std::time::Duration;

use async_trait::async_trait;
use murmur_core::{ContentClassifier, MurmurError, Verdict};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct ModerateRequest<'a> {
    text: &'a str,
}

/// HTTP client for content moderation.
///
/// Same shape as the mood adapter: bounded timeout, one retry on
/// transient statuses, failures surfaced as `ClassifierUnavailable`.
/// The moderation engine catches those and runs the keyword fallback;
/// they never reach a service caller.
#[derive(Debug, Clone)]
pub struct HttpContentClassifier {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl HttpContentClassifier {
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
        format!("{}/v1/moderate", self.base_url)
    }
}

#[async_trait]
impl ContentClassifier for HttpContentClassifier {
    async fn moderate(&self, text: &str) -> Result<Verdict, MurmurError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying content classification after transient error");
                tokio::time::sleep(Duration::from_millis(200)).await;
            }

            let response = self
                .client
                .post(self.endpoint())
                .json(&ModerateRequest { text })
                .send()
                .await
                .map_err(|e| {
                    MurmurError::ClassifierUnavailable(format!("moderation request failed: {e}"))
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "content classification response");

            if status.is_success() {
                // Verdict's serde shape already defaults missing maps; it
                // is the typed boundary for this payload.
                return response.json::<Verdict>().await.map_err(|e| {
                    MurmurError::ClassifierUnavailable(format!(
                        "moderation response malformed: {e}"
                    ))
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                last_error = Some(MurmurError::ClassifierUnavailable(format!(
                    "moderation service returned {status}"
                )));
                continue;
            }

            return Err(MurmurError::ClassifierUnavailable(format!(
                "moderation service returned {status}"
            )));
        }

        Err(last_error.unwrap_or_else(|| {
            MurmurError::ClassifierUnavailable("content classification failed after retries".into())
        }))
    }
}

/// Transient statuses worth one retry.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
