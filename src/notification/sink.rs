//! Structured log sink for accepted notifications.
//!
//! Accepted notifications are the service's output, so they are written as
//! JSON lines by [`JsonLogSink`] with the decoded event nested as an object
//! under `attributes.payload`. Diagnostic logging stays on `tracing`.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};

use crate::notification::events::ClusterEvent;

/// One accepted notification, ready for the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRecord {
    /// Envelope data; the primary log message.
    pub data: String,
    pub message_id: Option<String>,
    pub publish_time: Option<String>,
    pub attributes: RecordAttributes,
}

/// The required attributes with the raw payload replaced by its decoded form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordAttributes {
    pub project_id: String,
    pub cluster_location: String,
    pub cluster_name: String,
    pub type_url: String,
    pub payload: ClusterEvent,
}

/// Destination for accepted notifications.
///
/// Emission cannot fail from the caller's point of view and may be called
/// from many requests at once.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, record: &NotificationRecord);
}

const TARGET: &str = "gke_notify::notification";

#[derive(Serialize)]
struct LogLine<'a> {
    time: &'a str,
    level: &'static str,
    target: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    publish_time: Option<&'a str>,
    attributes: &'a RecordAttributes,
}

/// Writes each record as one `INFO` JSON line.
///
/// ```text
/// {"time":"…","level":"INFO","target":"gke_notify::notification","message":"<data>",
///  "attributes":{"project_id":"…",…,"payload":{<decoded event>}}}
/// ```
#[derive(Debug)]
pub struct JsonLogSink<W = io::Stdout> {
    writer: Mutex<W>,
}

impl JsonLogSink<io::Stdout> {
    /// A sink writing to standard output, next to the diagnostic log.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLogSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn line(record: &NotificationRecord) -> serde_json::Result<Vec<u8>> {
        let mut time = String::new();
        if SystemTime.format_time(&mut Writer::new(&mut time)).is_err() {
            time.clear();
        }

        let mut line = serde_json::to_vec(&LogLine {
            time: &time,
            level: "INFO",
            target: TARGET,
            message: &record.data,
            message_id: record.message_id.as_deref(),
            publish_time: record.publish_time.as_deref(),
            attributes: &record.attributes,
        })?;
        line.push(b'\n');
        Ok(line)
    }
}

impl<W: Write + Send> NotificationSink for JsonLogSink<W> {
    fn emit(&self, record: &NotificationRecord) {
        let line = match Self::line(record) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize notification record");
                return;
            }
        };

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.write_all(&line).and_then(|()| writer.flush()) {
            tracing::warn!(error = %e, "Failed to write notification record");
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<NotificationRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn records(&self) -> Vec<NotificationRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for MemorySink {
    fn emit(&self, record: &NotificationRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::dispatcher::Dispatcher;
    use crate::notification::events::{DecodeMode, UpgradeEvent};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn record() -> NotificationRecord {
        NotificationRecord {
            data: "x".into(),
            message_id: Some("msg-1".into()),
            publish_time: None,
            attributes: RecordAttributes {
                project_id: "p1".into(),
                cluster_location: "us-central1".into(),
                cluster_name: "c1".into(),
                type_url: "type.googleapis.com/google.container.v1beta1.UpgradeEvent".into(),
                payload: ClusterEvent::Upgrade(UpgradeEvent {
                    resource_type: Some("MASTER".into()),
                    ..Default::default()
                }),
            },
        }
    }

    fn lines(sink: &JsonLogSink<Vec<u8>>) -> Vec<Value> {
        let bytes = sink.writer.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn json_line_nests_decoded_payload() {
        let sink = JsonLogSink::new(Vec::new());
        sink.emit(&record());

        let lines = lines(&sink);
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["level"], "INFO");
        assert_eq!(line["target"], TARGET);
        assert_eq!(line["message"], "x");
        assert_eq!(line["message_id"], "msg-1");
        assert!(line.get("publish_time").is_none());
        assert!(!line["time"].as_str().unwrap().is_empty());
        assert_eq!(
            line["attributes"],
            json!({
                "project_id": "p1",
                "cluster_location": "us-central1",
                "cluster_name": "c1",
                "type_url": "type.googleapis.com/google.container.v1beta1.UpgradeEvent",
                "payload": {"resourceType": "MASTER"},
            })
        );
    }

    #[test]
    fn dispatcher_logs_decoded_event_as_object() {
        let sink = Arc::new(JsonLogSink::new(Vec::new()));
        let dispatcher = Dispatcher::new(sink.clone(), DecodeMode::Strict);
        let body = json!({
            "data": "x",
            "attributes": {
                "project_id": "p1",
                "cluster_location": "us-central1",
                "cluster_name": "c1",
                "type_url": "type.googleapis.com/google.container.v1beta1.UpgradeEvent",
                "payload": r#"{"resourceType":"MASTER"}"#,
            },
            "publishTime": "2024-05-01T12:00:00Z",
        });

        dispatcher
            .handle_body(&serde_json::to_vec(&body).unwrap())
            .unwrap();

        let lines = lines(&sink);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["publish_time"], "2024-05-01T12:00:00Z");
        let payload = &lines[0]["attributes"]["payload"];
        assert!(payload.is_object(), "payload logged as {payload}");
        assert_eq!(payload["resourceType"], "MASTER");
    }

    #[test]
    fn one_line_per_record() {
        let sink = JsonLogSink::new(Vec::new());
        sink.emit(&record());
        sink.emit(&record());
        assert_eq!(lines(&sink).len(), 2);
    }
}
