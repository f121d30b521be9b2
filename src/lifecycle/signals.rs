//! Stop triggers.
//!
//! The orchestrator waits on a [`StopSignal`] rather than on the OS directly,
//! so anything that can say "stop now" can drive a shutdown.

use std::future::Future;

use tokio::sync::broadcast;

/// Something that eventually asks the process to stop.
pub trait StopSignal: Send {
    /// Resolves once a stop has been requested.
    fn recv(&mut self) -> impl Future<Output = ()> + Send;
}

/// Process termination signals.
///
/// Handlers are installed by [`TerminationSignal::register`], so a signal that
/// arrives before anyone awaits [`StopSignal::recv`] is not lost.
#[cfg(unix)]
#[derive(Debug)]
pub struct TerminationSignal {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl TerminationSignal {
    /// Install SIGTERM and SIGINT handlers. Requires a Tokio runtime.
    pub fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }
}

#[cfg(unix)]
impl StopSignal for TerminationSignal {
    async fn recv(&mut self) {
        tokio::select! {
            _ = self.sigterm.recv() => tracing::info!("Received SIGTERM"),
            _ = self.sigint.recv() => tracing::info!("Received SIGINT"),
        }
    }
}

/// Ctrl-C, where Unix signals are unavailable.
#[cfg(not(unix))]
#[derive(Debug)]
pub struct TerminationSignal {
    _private: (),
}

#[cfg(not(unix))]
impl TerminationSignal {
    pub fn register() -> std::io::Result<Self> {
        Ok(Self { _private: () })
    }
}

#[cfg(not(unix))]
impl StopSignal for TerminationSignal {
    async fn recv(&mut self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C, stopping");
            return;
        }
        tracing::info!("Received Ctrl-C");
    }
}

/// A subscription to a [`Shutdown`](crate::lifecycle::Shutdown) coordinator.
///
/// Fires on trigger, and also when every sender is gone.
impl StopSignal for broadcast::Receiver<()> {
    async fn recv(&mut self) {
        let _ = broadcast::Receiver::recv(self).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use std::time::Duration;

    #[tokio::test]
    async fn broadcast_receiver_fires_on_trigger() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();

        let waiter = tokio::spawn(async move { StopSignal::recv(&mut signal).await });
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("stop signal should fire")
            .unwrap();
    }

    #[tokio::test]
    async fn trigger_before_wait_is_not_lost() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), StopSignal::recv(&mut signal))
            .await
            .expect("buffered trigger should be observed");
    }

    #[tokio::test]
    async fn dropped_coordinator_counts_as_stop() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        drop(shutdown);

        tokio::time::timeout(Duration::from_secs(1), StopSignal::recv(&mut signal))
            .await
            .expect("closed channel should resolve");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn termination_signal_registers() {
        assert!(TerminationSignal::register().is_ok());
    }
}
