//! Start/stop orchestration for a single serving run.
//!
//! [`Orchestrator::serve`] starts the listener on its own task and then waits
//! for whichever comes first: the listener exiting, or the stop signal. On a
//! stop it runs the caller's shutdown under a fixed deadline.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::lifecycle::signals::StopSignal;
use crate::lifecycle::state::LifecycleState;
use crate::net::ListenerError;

/// Stand-in for budgets too large to represent as an instant.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Time budget handed to the shutdown callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// A deadline `budget` from now, clamped to about thirty years.
    pub fn after(budget: Duration) -> Self {
        let now = Instant::now();
        let at = now
            .checked_add(budget)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self { at, budget }
    }

    pub fn instant(&self) -> Instant {
        self.at
    }

    /// The full budget this deadline was created with.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}

/// Failure of the shutdown callback.
#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("shutdown did not finish within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("shutdown aborted: {0}")]
    Aborted(String),
}

/// Process-scoped failures. All of them are fatal to the serving run.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("server failed: {0}")]
    Listener(#[source] ListenerError),

    #[error("server task ended abnormally: {0}")]
    ListenerAborted(String),

    #[error("server shutdown failed: {0}")]
    Shutdown(#[source] ShutdownError),
}

/// Owns the lifecycle state of one serving run.
///
/// `serve` consumes the orchestrator, so a run cannot be restarted.
#[derive(Debug)]
pub struct Orchestrator<S> {
    signal: S,
    state: watch::Sender<LifecycleState>,
}

enum Race {
    ListenerExited(Result<Result<(), ListenerError>, tokio::task::JoinError>),
    StopRequested,
}

impl<S: StopSignal> Orchestrator<S> {
    /// `signal` should already be armed so no stop request is missed.
    pub fn new(signal: S) -> Self {
        let (state, _) = watch::channel(LifecycleState::Idle);
        Self { signal, state }
    }

    /// Observe state transitions.
    pub fn state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Run `start` until it exits or a stop is requested.
    ///
    /// `start` runs on a spawned task and should only return once the
    /// listener has stopped. A clean return, which is how the listener reports
    /// a close after its own drain, is success; any listener error is returned. On a stop request,
    /// `shutdown` is awaited for at most `timeout` and its failure, including
    /// running out of time, is returned.
    pub async fn serve<F, Fut, G, GFut>(
        mut self,
        start: F,
        shutdown: G,
        timeout: Duration,
    ) -> Result<(), LifecycleError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
        G: FnOnce(Deadline) -> GFut,
        GFut: Future<Output = Result<(), ShutdownError>>,
    {
        self.transition(LifecycleState::Running);
        let mut listener = tokio::spawn(start());

        let race = tokio::select! {
            joined = &mut listener => Race::ListenerExited(joined),
            () = self.signal.recv() => Race::StopRequested,
        };

        match race {
            Race::ListenerExited(joined) => {
                self.transition(LifecycleState::Stopped);
                match joined {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, "Listener exited");
                        Err(LifecycleError::Listener(e))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Listener task failed");
                        Err(LifecycleError::ListenerAborted(e.to_string()))
                    }
                }
            }
            Race::StopRequested => {
                self.transition(LifecycleState::ShuttingDown);
                let deadline = Deadline::after(timeout);
                tracing::info!(
                    timeout_secs = timeout.as_secs_f64(),
                    "Stop requested, shutting down"
                );

                let drained = tokio::time::timeout_at(deadline.instant(), shutdown(deadline));
                let result = match drained.await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(LifecycleError::Shutdown(e)),
                    Err(_) => Err(LifecycleError::Shutdown(ShutdownError::DeadlineExceeded(
                        timeout,
                    ))),
                };
                self.transition(LifecycleState::Stopped);

                if let Err(e) = &result {
                    tracing::error!(error = %e, "Shutdown failed");
                }
                result
            }
        }
    }

    fn transition(&self, next: LifecycleState) {
        self.state.send_modify(|state| {
            debug_assert!(
                state.can_transition_to(next),
                "invalid lifecycle transition {state} -> {next}"
            );
            tracing::debug!(from = %state, to = %next, "Lifecycle transition");
            *state = next;
        });
    }
}
