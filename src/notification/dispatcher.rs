//! Validation and dispatch of cluster notifications.

use std::sync::Arc;

use crate::notification::attributes::ClusterAttributes;
use crate::notification::envelope::Envelope;
use crate::notification::error::Rejection;
use crate::notification::events::{DecodeMode, EventKind};
use crate::notification::sink::{NotificationRecord, NotificationSink, RecordAttributes};
use crate::observability::metrics;

/// Outcome of a notification that was decoded and logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted {
    pub kind: EventKind,
}

/// Validates envelopes, decodes their payloads and hands them to the sink.
///
/// Holds no mutable state; one instance serves every request concurrently.
#[derive(Clone)]
pub struct Dispatcher {
    sink: Arc<dyn NotificationSink>,
    mode: DecodeMode,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>, mode: DecodeMode) -> Self {
        Self { sink, mode }
    }

    /// Handle a raw request body.
    pub fn handle_body(&self, body: &[u8]) -> Result<Accepted, Rejection> {
        let result = Envelope::from_slice(body)
            .map_err(Rejection::MalformedEnvelope)
            .and_then(|envelope| self.dispatch(envelope));
        self.observe(result)
    }

    /// Handle an already-parsed envelope.
    pub fn handle(&self, envelope: Envelope) -> Result<Accepted, Rejection> {
        let result = self.dispatch(envelope);
        self.observe(result)
    }

    fn dispatch(&self, mut envelope: Envelope) -> Result<Accepted, Rejection> {
        let attributes = ClusterAttributes::extract(&mut envelope.attributes)
            .map_err(Rejection::MissingAttribute)?;

        let kind = attributes
            .type_url
            .parse::<EventKind>()
            .map_err(|unrecognized| Rejection::UnknownEventType(unrecognized.0))?;

        let event = kind
            .decode(&attributes.payload, self.mode)
            .map_err(|source| Rejection::PayloadDecode { kind, source })?;

        self.sink.emit(&NotificationRecord {
            data: envelope.data,
            message_id: envelope.message_id,
            publish_time: envelope.publish_time,
            attributes: RecordAttributes {
                project_id: attributes.project_id,
                cluster_location: attributes.cluster_location,
                cluster_name: attributes.cluster_name,
                type_url: attributes.type_url,
                payload: event,
            },
        });

        Ok(Accepted { kind })
    }

    fn observe(&self, result: Result<Accepted, Rejection>) -> Result<Accepted, Rejection> {
        match &result {
            Ok(accepted) => {
                metrics::record_notification(accepted.kind.name(), "accepted");
            }
            Err(rejection) => {
                let event_type = match rejection {
                    Rejection::PayloadDecode { kind, .. } => kind.name(),
                    _ => "unknown",
                };
                metrics::record_notification(event_type, rejection.reason());
                tracing::error!(
                    reason = rejection.reason(),
                    error = %rejection,
                    "Rejected notification"
                );
            }
        }
        result
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
