//! Request-scoped rejection taxonomy.

use thiserror::Error;

use crate::notification::events::{EventKind, PayloadError};

/// Why an inbound notification was not accepted.
///
/// The detail is for internal logs only; callers see a bare 400.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("failed to decode request body: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("missing attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    #[error("failed to decode {kind} payload: {source}")]
    PayloadDecode {
        kind: EventKind,
        #[source]
        source: PayloadError,
    },
}

impl Rejection {
    /// Stable label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::MalformedEnvelope(_) => "malformed_envelope",
            Rejection::MissingAttribute(_) => "missing_attribute",
            Rejection::UnknownEventType(_) => "unknown_event_type",
            Rejection::PayloadDecode { .. } => "payload_decode_error",
        }
    }
}
