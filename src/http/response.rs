//! Response mapping for rejected notifications.
//!
//! Every rejection is a bare `400 Bad Request`. The cause has already been
//! logged; it is never echoed to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::notification::Rejection;

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        status_phrase(StatusCode::BAD_REQUEST)
    }
}

/// A response whose body is the status code's canonical reason.
pub fn status_phrase(status: StatusCode) -> Response {
    (status, status.canonical_reason().unwrap_or_default()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejection_hides_detail() {
        let response = Rejection::UnknownEventType("secret-type".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Bad Request");
    }
}
