use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The main error type for the intake service
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request timeout")]
    RequestTimeout,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(String),
}

/// Body of every error response.
///
/// Matches the `{"message": ...}` shape used by the webhook endpoint so callers
/// only ever parse one format.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
    error_id: String,
}

impl IntakeError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::UnprocessableEntity(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) | Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
            #[cfg(feature = "database")]
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    /// Whether the failure is transient and the caller may retry.
    pub fn is_retryable(&self) -> bool {
        self.status_code().is_server_error() || matches!(self, Self::RequestTimeout)
    }

    /// Returns a message safe to show to clients.
    ///
    /// Client errors (4xx) keep their message. Server errors (5xx) collapse to
    /// a generic string; the full error is only written to the server log
    /// (CWE-209).
    fn safe_message(&self) -> String {
        match self {
            Self::NotFound(msg) => format!("Not found: {}", msg),
            Self::BadRequest(msg) => format!("Bad request: {}", msg),
            Self::Unauthorized(_) => "Unauthorized".to_string(),
            Self::UnprocessableEntity(msg) => format!("Unprocessable entity: {}", msg),
            Self::RequestTimeout => "Request timeout".to_string(),

            Self::Internal(_) | Self::Anyhow(_) => "Internal server error".to_string(),
            Self::ServiceUnavailable(_) => "Service unavailable".to_string(),

            #[cfg(feature = "database")]
            Self::Database(_) => "Database error".to_string(),
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            status = status.as_u16(),
            error_id = %error_id,
            error = %self,
            "Request failed"
        );

        let body = ErrorResponse {
            message: self.safe_message(),
            error_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for intake handlers and collaborators
pub type Result<T> = std::result::Result<T, IntakeError>;

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            IntakeError::BadRequest(format!("JSON error: {}", err))
        } else {
            IntakeError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}

impl From<reqwest::Error> for IntakeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IntakeError::RequestTimeout
        } else if err.is_connect() {
            IntakeError::ServiceUnavailable(format!("Connection error: {}", err))
        } else if err.is_status() {
            match err.status().map(|s| s.as_u16()) {
                Some(401) | Some(403) => {
                    IntakeError::Internal("Upstream authentication failed".to_string())
                }
                Some(429) => IntakeError::ServiceUnavailable("Upstream rate limit exceeded".to_string()),
                Some(503) => IntakeError::ServiceUnavailable("Upstream service unavailable".to_string()),
                _ => IntakeError::Internal(format!("Upstream error: {}", err)),
            }
        } else {
            IntakeError::Internal(format!("Request error: {}", err))
        }
    }
}

#[cfg(feature = "database")]
impl From<sea_orm::DbErr> for IntakeError {
    fn from(err: sea_orm::DbErr) -> Self {
        match &err {
            sea_orm::DbErr::RecordNotFound(msg) => IntakeError::NotFound(if msg.is_empty() {
                "Record not found".to_string()
            } else {
                msg.clone()
            }),
            sea_orm::DbErr::Query(inner) => IntakeError::Database(format!("Query error: {}", inner)),
            sea_orm::DbErr::Exec(inner) => {
                IntakeError::Database(format!("Execution error: {}", inner))
            }
            sea_orm::DbErr::Conn(inner) => {
                IntakeError::Database(format!("Connection error: {}", inner))
            }
            _ => IntakeError::Database(format!("Database error: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_error() {
        let err = IntakeError::unauthorized("bad signature");
        assert!(matches!(err, IntakeError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Unauthorized: bad signature");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unprocessable_error() {
        let err = IntakeError::unprocessable("missing reference id");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_internal_error_is_retryable() {
        let err = IntakeError::internal("store offline");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_safe_message_hides_server_details() {
        let err = IntakeError::internal("connection string postgres://secret@db");
        assert_eq!(err.safe_message(), "Internal server error");

        let err = IntakeError::service_unavailable("upstream sift down");
        assert_eq!(err.safe_message(), "Service unavailable");
    }

    #[test]
    fn test_safe_message_keeps_client_details() {
        let err = IntakeError::bad_request("Invalid JSON");
        assert_eq!(err.safe_message(), "Bad request: Invalid JSON");
    }

    #[test]
    fn test_from_serde_json_syntax_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let err: IntakeError = json_err.into();
        assert!(matches!(err, IntakeError::BadRequest(_)));
    }

    #[test]
    fn test_from_anyhow() {
        let err: IntakeError = anyhow::anyhow!("boom").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_into_response_shape() {
        let response = IntakeError::not_found("record 42").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Not found: record 42");
        assert!(body["error_id"].is_string());
    }
}
