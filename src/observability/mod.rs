//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (notification counters)
//!
//! Consumers:
//!     → Log aggregation (JSON lines on stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID is carried on the request span
//! - Metrics are cheap no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
