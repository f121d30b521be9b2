//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gke_notifications_total` (counter): handled notifications by
//!   `event_type` and `outcome` (`accepted` or the rejection reason)

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const NOTIFICATIONS_TOTAL: &str = "gke_notifications_total";

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Count one handled notification.
pub fn record_notification(event_type: &'static str, outcome: &'static str) {
    metrics::counter!(
        NOTIFICATIONS_TOTAL,
        "event_type" => event_type,
        "outcome" => outcome
    )
    .increment(1);
}
