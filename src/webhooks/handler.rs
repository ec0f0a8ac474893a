use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};

use super::error::{MalformedPayloadPolicy, WebhookError};
use super::signature::SIGNATURE_HEADER;
use crate::app::AppContext;
use crate::http::{MessageResponse, RouteModule};
use crate::risk::RequestMeta;

pub const SUCCESS_MESSAGE: &str = "Webhook successfully processed";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
pub const FAILURE_MESSAGE: &str = "Failed to process webhook";
pub const MALFORMED_MESSAGE: &str = "Malformed webhook payload";

/// Routes for the Persona webhook endpoint.
///
/// # Example
///
/// ```rust,ignore
/// let app = App::new()
///     .with_context(context)
///     .register_module(PersonaWebhookModule::new("/webhooks/persona"));
/// ```
pub struct PersonaWebhookModule {
    path: String,
}

impl PersonaWebhookModule {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for PersonaWebhookModule {
    fn default() -> Self {
        Self::new("/webhooks/persona")
    }
}

impl RouteModule for PersonaWebhookModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new().route(&self.path, post(persona_webhook))
    }
}

/// Receive a Persona webhook.
///
/// The body is taken as raw bytes so the signature is checked against exactly
/// what Persona signed.
pub async fn persona_webhook(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let processor = match ctx.persona_webhook() {
        Ok(processor) => processor,
        Err(e) => {
            tracing::error!(error = %e, "Persona webhook received but not configured");
            return MessageResponse::new(StatusCode::INTERNAL_SERVER_ERROR, FAILURE_MESSAGE)
                .into_response();
        }
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let request = RequestMeta::from_headers(&headers);

    match processor.process(signature, &body, &request).await {
        Ok(processed) => {
            tracing::debug!(
                subject_id = %processed.record.subject_id,
                notified = processed.side_effects.notified,
                risk_tracked = processed.side_effects.risk_tracked,
                "Persona webhook acknowledged"
            );
            MessageResponse::ok(SUCCESS_MESSAGE).into_response()
        }
        Err(err) => failure_response(&err, ctx.malformed_payload_policy()).into_response(),
    }
}

/// Map a pipeline failure to its response, logging it first.
fn failure_response(err: &WebhookError, policy: MalformedPayloadPolicy) -> MessageResponse {
    let status = err.status_code(policy);

    let message = match status {
        StatusCode::UNAUTHORIZED => {
            tracing::warn!(error = %err, "Rejected Persona webhook");
            UNAUTHORIZED_MESSAGE
        }
        StatusCode::UNPROCESSABLE_ENTITY => {
            tracing::warn!(error = %err, "Rejected malformed Persona webhook");
            MALFORMED_MESSAGE
        }
        _ => {
            tracing::error!(error = %err, "Failed to process Persona webhook");
            FAILURE_MESSAGE
        }
    };

    MessageResponse::new(status, message)
}
