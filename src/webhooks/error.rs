use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IntakeError;

/// How to answer a webhook whose body is not usable.
///
/// Covers bodies that are not JSON and events without a reference id. Persona
/// retries non-2xx deliveries, so `Retry` keeps delivering a payload that will
/// never succeed; `Reject` answers 422 instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPayloadPolicy {
    /// Respond 500, like any other processing failure.
    #[default]
    Retry,
    /// Respond 422 with a distinct message.
    Reject,
}

impl fmt::Display for MalformedPayloadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retry => f.write_str("retry"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

impl FromStr for MalformedPayloadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retry" => Ok(Self::Retry),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "invalid malformed payload policy '{}', expected 'retry' or 'reject'",
                other
            )),
        }
    }
}

/// Why a webhook delivery was not processed.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("missing Persona-Signature header")]
    MissingSignature,

    #[error("invalid Persona webhook signature")]
    InvalidSignature,

    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("webhook payload has no reference id (inquiry {inquiry_id:?})")]
    MissingReferenceId { inquiry_id: Option<String> },

    #[error("failed to persist verification for subject {subject_id}: {source}")]
    Persistence {
        subject_id: String,
        #[source]
        source: IntakeError,
    },
}

impl WebhookError {
    /// Signature problems: the request is not from Persona.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::MissingSignature | Self::InvalidSignature)
    }

    /// Authentic requests whose body can never be processed.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedPayload(_) | Self::MissingReferenceId { .. }
        )
    }

    pub fn status_code(&self, policy: MalformedPayloadPolicy) -> StatusCode {
        if self.is_unauthenticated() {
            StatusCode::UNAUTHORIZED
        } else if self.is_malformed() && policy == MalformedPayloadPolicy::Reject {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<WebhookError> for IntakeError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                IntakeError::unauthorized(err.to_string())
            }
            WebhookError::MalformedPayload(_) | WebhookError::MissingReferenceId { .. } => {
                IntakeError::unprocessable(err.to_string())
            }
            WebhookError::Persistence { source, .. } => source,
        }
    }
}
