//! Request handling helpers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Resolve the endpoint name from the request path
//! - Parse the JSON request body
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A caller-supplied `x-request-id` is kept and echoed back
//! - Only non-empty JSON objects count as a valid body

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use serde_json::{Map, Value};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

/// Span for one request, tagged with its correlation ID.
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// Endpoint name: `path` with every occurrence of `prefix` removed and
/// surrounding slashes trimmed.
pub fn endpoint_from_path(path: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return path.trim_matches('/').to_string();
    }
    path.replace(prefix, "").trim_matches('/').to_string()
}

/// Parse a request body that must be a non-empty JSON object.
pub fn parse_json_object(body: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Some(map),
        _ => None,
    }
}
