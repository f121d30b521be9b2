//! GKE cluster notification receiver.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 GKE-NOTIFY                   │
//!   Push delivery       │  ┌─────────┐   ┌─────────┐   ┌────────────┐  │
//!   POST /gke ──────────┼─▶│   net   │──▶│  http   │──▶│notification│  │
//!                       │  │listener │   │ server  │   │ dispatcher │  │
//!                       │  └─────────┘   └─────────┘   └─────┬──────┘  │
//!                       │                                    ▼         │
//!                       │                              ┌────────────┐  │
//!                       │                              │    sink    │──┼──▶ JSON logs
//!                       │                              └────────────┘  │
//!                       │  ┌────────────────────────────────────────┐  │
//!   SIGTERM ────────────┼─▶│  lifecycle: orchestrator + deadline    │  │
//!                       │  └────────────────────────────────────────┘  │
//!                       └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use gke_notify::config::{load_config, validate_config, ConfigError, ServiceConfig};
use gke_notify::lifecycle::{run_service, TerminationSignal};
use gke_notify::observability::{logging, metrics};

/// Receive GKE cluster notifications and log them.
#[derive(Parser, Debug)]
#[command(name = "gke-notify")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(long)]
    bind_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind_address) = args.bind_address {
        config.listener.bind_address = bind_address;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        shutdown_timeout_secs = config.timeouts.shutdown_secs,
        "gke-notify starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    error = %e,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    // Armed before the listener starts so an early SIGTERM is not lost.
    let signal = TerminationSignal::register()?;

    run_service(config, signal).await?;
    Ok(())
}
