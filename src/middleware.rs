use axum::body::Body;
use axum::http::Request;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id generator for `SetRequestIdLayer`
///
/// Each request without an `x-request-id` gets a v4 UUID. The id is recorded
/// on the request span, so webhook logs emitted inside it carry it too.
#[derive(Clone, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(request_id))
    }
}

/// The request's `x-request-id`, or `-` when the header is absent or not text.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
}

/// Span for `TraceLayer::make_span_with`
pub fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id(request),
    )
}
