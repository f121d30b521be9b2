//! Push-delivery envelope.

use std::collections::HashMap;

use serde::Deserialize;

/// One inbound push-delivery message.
///
/// `data` is opaque and only travels into the log record. Everything the
/// dispatcher acts on lives in `attributes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub data: String,

    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Delivery id assigned by the publisher, when present.
    #[serde(default)]
    pub message_id: Option<String>,

    #[serde(default)]
    pub publish_time: Option<String>,
}

impl Envelope {
    /// Parse an envelope from a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}
