//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → HttpServer → Orchestrator::serve(start, shutdown, timeout)
//!
//! Orchestrator (orchestrator.rs):
//!     spawn start ─┬─ listener exits first → Stopped (error unless clean close)
//!                  └─ stop signal first   → ShuttingDown → shutdown(deadline) → Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT, or any broadcast trigger → stop request
//! ```
//!
//! # Design Decisions
//! - Signal handlers are installed before the listener starts
//! - Single-shot: `serve` consumes the orchestrator
//! - Shutdown has a deadline; missing it is an error, not a silent exit

pub mod orchestrator;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use orchestrator::{Deadline, LifecycleError, Orchestrator, ShutdownError};
pub use shutdown::Shutdown;
pub use signals::{StopSignal, TerminationSignal};
pub use startup::{run_service, run_service_with_sink};
pub use state::LifecycleState;
