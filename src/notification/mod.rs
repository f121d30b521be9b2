//! Cluster notification handling.
//!
//! # Data Flow
//! ```text
//! POST /gke body
//!     → envelope.rs (parse push-delivery envelope)
//!     → attributes.rs (required attributes, first missing key rejects)
//!     → events.rs (type_url → EventKind, payload → ClusterEvent)
//!     → sink.rs (one structured record per accepted notification)
//! ```
//!
//! # Design Decisions
//! - Fail closed: every malformed or unrecognized input is a `Rejection`
//! - The event registry is a closed enum; no runtime type inspection
//! - Only accepted notifications reach the sink; rejection detail goes to
//!   diagnostic logs and never to the caller

pub mod attributes;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod events;
pub mod sink;

pub use attributes::{ClusterAttributes, REQUIRED_ATTRIBUTES};
pub use dispatcher::{Accepted, Dispatcher};
pub use envelope::Envelope;
pub use error::Rejection;
pub use events::{ClusterEvent, DecodeMode, EventKind, PayloadError};
pub use sink::{
    JsonLogSink, MemorySink, NotificationRecord, NotificationSink, RecordAttributes,
};
