//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gke_notify::config::ServiceConfig;
use gke_notify::lifecycle::{run_service_with_sink, LifecycleError, Shutdown};
use gke_notify::notification::NotificationSink;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

pub const SECURITY_BULLETIN: &str =
    "type.googleapis.com/google.container.v1beta1.SecurityBulletinEvent";
pub const UPGRADE_AVAILABLE: &str =
    "type.googleapis.com/google.container.v1beta1.UpgradeAvailableEvent";
pub const UPGRADE: &str = "type.googleapis.com/google.container.v1beta1.UpgradeEvent";
pub const UPGRADE_INFO: &str = "type.googleapis.com/google.container.v1beta1.UpgradeInfoEvent";

/// A complete push envelope for `type_url` carrying `payload`.
pub fn envelope(type_url: &str, payload: &str) -> Value {
    json!({
        "data": "x",
        "attributes": {
            "project_id": "p1",
            "cluster_location": "us-central1",
            "cluster_name": "c1",
            "type_url": type_url,
            "payload": payload,
        }
    })
}

/// Default config bound to `addr` with a short drain deadline.
pub fn config_for(addr: SocketAddr, shutdown_secs: u64) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = addr.to_string();
    config.timeouts.shutdown_secs = shutdown_secs;
    config
}

/// A running service plus the trigger that stops it.
pub struct RunningService {
    pub stop: Shutdown,
    pub handle: JoinHandle<Result<(), LifecycleError>>,
}

impl RunningService {
    /// Request a stop and wait for `run_service` to return.
    pub async fn stop(self) -> Result<(), LifecycleError> {
        self.stop.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("service did not stop")
            .expect("service task panicked")
    }
}

/// Start the service on `addr` and wait until it answers health checks.
pub async fn start_service(
    config: ServiceConfig,
    sink: Arc<dyn NotificationSink>,
) -> RunningService {
    let addr: SocketAddr = config.listener.bind_address.parse().unwrap();
    let stop = Shutdown::new();
    let signal = stop.subscribe();
    let handle = tokio::spawn(run_service_with_sink(config, signal, sink));

    wait_until_healthy(addr).await;
    RunningService { stop, handle }
}

/// Poll `GET /health` until it answers.
pub async fn wait_until_healthy(addr: SocketAddr) {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    for _ in 0..100 {
        if let Ok(res) = client.get(format!("http://{}/health", addr)).send().await {
            if res.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("service on {} never became healthy", addr);
}
