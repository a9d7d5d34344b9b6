//! API error bodies.

use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

/// Error response body for 4xx/5xx replies.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Status code plus JSON error body.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}
