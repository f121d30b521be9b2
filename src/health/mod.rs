//! Liveness endpoint.
//!
//! The service has no dependencies to probe, so answering at all means
//! healthy.

use axum::http::StatusCode;
use axum::response::Response;

use crate::http::response::status_phrase;

/// `GET /health`
pub async fn health_handler() -> Response {
    status_phrase(StatusCode::OK)
}
