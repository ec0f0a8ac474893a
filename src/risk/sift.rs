//! Sift events API client.
//!
//! Sends an `$update_account` event for the subject and asks Sift to return
//! the recomputed score in the same response.

use super::{RequestMeta, RiskAssessment, RiskScorer};
use crate::config::RiskConfig;
use crate::error::{IntakeError, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::time::Duration;

/// Abuse type whose score is reported first when present.
const PRIMARY_ABUSE_TYPE: &str = "account_abuse";

/// Risk scorer backed by the Sift events API.
///
/// The API key is held as a [`SecretString`] and never logged.
pub struct SiftRiskScorer {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
}

impl SiftRiskScorer {
    pub fn new(api_key: SecretString, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Self::build_client(timeout),
            api_key,
            endpoint: endpoint.into(),
        }
    }

    /// Build a scorer from config, or `None` when no API key is configured.
    pub fn from_config(config: &RiskConfig) -> Option<Self> {
        config.sift_api_key.clone().map(|key| {
            Self::new(
                key,
                config.sift_endpoint.clone(),
                Duration::from_secs(config.timeout_seconds),
            )
        })
    }

    fn build_client(timeout: Duration) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("idv-intake")
            .build()
            .unwrap_or_default()
    }

    /// Build the `$update_account` event body.
    fn update_account_event(&self, subject_id: &str, request: &RequestMeta) -> Value {
        let mut event = json!({
            "$type": "$update_account",
            "$api_key": self.api_key.expose_secret(),
            "$user_id": subject_id,
        });

        if let Some(ip) = &request.ip {
            event["$ip"] = json!(ip);
        }
        if let Some(user_agent) = &request.user_agent {
            event["$browser"] = json!({ "$user_agent": user_agent });
        }

        event
    }
}

/// Pull a score out of a Sift events response.
///
/// Prefers `account_abuse`, otherwise takes any abuse type that has a score.
fn parse_score(response: &Value) -> Option<f64> {
    let scores = response.pointer("/score_response/scores")?.as_object()?;

    scores
        .get(PRIMARY_ABUSE_TYPE)
        .and_then(|s| s.get("score"))
        .and_then(Value::as_f64)
        .or_else(|| {
            scores
                .values()
                .find_map(|s| s.get("score").and_then(Value::as_f64))
        })
}

#[async_trait]
impl RiskScorer for SiftRiskScorer {
    async fn track_and_score(&self, subject_id: &str, request: &RequestMeta) -> Result<RiskAssessment> {
        let event = self.update_account_event(subject_id, request);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("return_score", "true")])
            .json(&event)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IntakeError::service_unavailable(format!(
                "Sift events API returned status: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        // Sift signals application-level errors with a non-zero status in a 200 body
        if let Some(status) = body.get("status").and_then(Value::as_i64) {
            if status != 0 {
                let message = body
                    .get("error_message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                return Err(IntakeError::internal(format!(
                    "Sift rejected event (status {}): {}",
                    status, message
                )));
            }
        }

        let assessment = RiskAssessment {
            score: parse_score(&body),
        };

        tracing::info!(
            subject_id = %subject_id,
            score = ?assessment.score,
            "Account re-tracked with Sift"
        );

        Ok(assessment)
    }
}
