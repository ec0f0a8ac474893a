use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// `{"message": ...}` body paired with a status code.
///
/// Every webhook response uses this shape, success or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(skip)]
    status: StatusCode,
    pub message: String,
}

impl MessageResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
