//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID assignment)
//!     → /gke: notification dispatcher │ /health: health handler
//!     → response.rs (rejection → 400)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
