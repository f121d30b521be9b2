//! GKE cluster notification receiver.
//!
//! Receives push-delivered cluster notifications (security bulletins,
//! available and applied upgrades, upgrade info), validates and decodes them,
//! and writes one structured log record per accepted notification.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod notification;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::{run_service, Orchestrator, Shutdown};
pub use notification::Dispatcher;
