//! Response envelopes.
//!
//! # Design Decisions
//! - Every response, success or failure, is an `AdapterResult` JSON envelope
//! - `Content-Type: application/json` is set by `axum::Json`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::adapter::AdapterResult;

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed. Only POST requests are accepted.";
pub const INVALID_JSON: &str = "Invalid JSON request body";
pub const BODY_TOO_LARGE: &str = "Request body too large";
pub const CREDENTIALS_REQUIRED: &str = "Email and password are required";
pub const ENDPOINT_NOT_FOUND: &str = "Endpoint not found";

/// Render an envelope with `status`.
pub fn json_response(status: StatusCode, envelope: AdapterResult) -> Response {
    (status, Json(envelope)).into_response()
}

/// Status for a login outcome: 401 on failure.
pub fn login_status(result: &AdapterResult) -> StatusCode {
    if result.success {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

/// Status for a registration outcome: 400 on failure.
pub fn register_status(result: &AdapterResult) -> StatusCode {
    if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    }
}
