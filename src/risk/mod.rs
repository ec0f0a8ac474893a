//! Account tracking and fraud risk scoring.
//!
//! After a verification changes, the subject's account is re-tracked with the
//! fraud-detection provider so its risk score reflects the new state.

mod sift;

pub use sift::SiftRiskScorer;

use crate::error::Result;
use async_trait::async_trait;
use axum::http::{HeaderMap, header};

/// Client details of the webhook request, forwarded with the tracking event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMeta {
    /// Extract client address and user agent from request headers.
    ///
    /// The first `X-Forwarded-For` hop wins over `X-Real-IP`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let ip = header_str("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|hop| hop.trim().to_string()))
            .filter(|v| !v.is_empty())
            .or_else(|| header_str("x-real-ip"));

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Self { ip, user_agent }
    }
}

/// Result of re-tracking an account.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskAssessment {
    /// Provider risk score in `[0, 1]`, when the provider returned one.
    pub score: Option<f64>,
}

/// Fraud-detection collaborator.
#[async_trait]
pub trait RiskScorer: Send + Sync {
    /// Re-track the subject's account and return its updated risk score.
    async fn track_and_score(&self, subject_id: &str, request: &RequestMeta) -> Result<RiskAssessment>;
}

/// Scorer used when no fraud-detection provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRiskScorer;

#[async_trait]
impl RiskScorer for NoopRiskScorer {
    async fn track_and_score(&self, subject_id: &str, _request: &RequestMeta) -> Result<RiskAssessment> {
        tracing::debug!(subject_id = %subject_id, "Risk scoring disabled, skipping account tracking");
        Ok(RiskAssessment::default())
    }
}

/// Test doubles for risk scoring.
pub mod test {
    use super::*;
    use crate::error::IntakeError;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Records tracked subjects, optionally failing every call.
    #[derive(Clone, Default)]
    pub struct RecordingRiskScorer {
        tracked: Arc<Mutex<Vec<(String, RequestMeta)>>>,
        fail: Arc<Mutex<bool>>,
    }

    impl RecordingRiskScorer {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn set_failing(&self, fail: bool) {
            *self.fail.lock().await = fail;
        }

        pub async fn tracked(&self) -> Vec<(String, RequestMeta)> {
            self.tracked.lock().await.clone()
        }
    }

    #[async_trait]
    impl RiskScorer for RecordingRiskScorer {
        async fn track_and_score(&self, subject_id: &str, request: &RequestMeta) -> Result<RiskAssessment> {
            if *self.fail.lock().await {
                return Err(IntakeError::service_unavailable("risk provider unreachable"));
            }
            self.tracked
                .lock()
                .await
                .push((subject_id.to_string(), request.clone()));
            Ok(RiskAssessment { score: Some(0.1) })
        }
    }
}
