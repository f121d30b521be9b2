//! Startup orchestration.
//!
//! Wires the HTTP server into the [`Orchestrator`]: binding happens inside
//! `start` so a bind failure is a listener exit, and `shutdown` fires the
//! server's graceful drain and waits for the listener to confirm it stopped.

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::orchestrator::{Deadline, LifecycleError, Orchestrator, ShutdownError};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::StopSignal;
use crate::net;
use crate::notification::{JsonLogSink, NotificationSink};

/// Serve until `signal` fires and the drain completes, or the listener fails.
pub async fn run_service<S: StopSignal>(
    config: ServiceConfig,
    signal: S,
) -> Result<(), LifecycleError> {
    run_service_with_sink(config, signal, Arc::new(JsonLogSink::stdout())).await
}

/// [`run_service`] with a custom notification sink.
pub async fn run_service_with_sink<S: StopSignal>(
    config: ServiceConfig,
    signal: S,
    sink: Arc<dyn NotificationSink>,
) -> Result<(), LifecycleError> {
    let timeout = config.shutdown_timeout();
    let listener_config = config.listener.clone();
    let server = HttpServer::with_sink(config, sink);

    let drain = Shutdown::new();
    let server_shutdown = drain.subscribe();
    let (stopped_tx, stopped_rx) = oneshot::channel();

    let start = move || async move {
        let listener = net::bind(&listener_config).await?;
        let result = server.run(listener, server_shutdown).await;
        let _ = stopped_tx.send(result.as_ref().map(|_| ()).map_err(ToString::to_string));
        result
    };

    let shutdown = move |deadline: Deadline| async move {
        tracing::info!(
            remaining_secs = deadline.remaining().as_secs_f64(),
            "Shutting down server"
        );
        drain.trigger();
        drain_outcome(stopped_rx.await)
    };

    let orchestrator = Orchestrator::new(signal);
    orchestrator.serve(start, shutdown, timeout).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Map what the server task reported after a drain request.
fn drain_outcome(
    stopped: Result<Result<(), String>, oneshot::error::RecvError>,
) -> Result<(), ShutdownError> {
    match stopped {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ShutdownError::Aborted(format!("server failed while draining: {e}"))),
        Err(_) => Err(ShutdownError::Aborted(
            "server task ended before draining".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serve_error_during_drain_is_not_clean() {
        let (tx, rx) = oneshot::channel();
        tx.send(Err("Serve failed: connection reset".to_string()))
            .unwrap();

        let err = drain_outcome(rx.await).unwrap_err();
        assert!(matches!(
            err,
            ShutdownError::Aborted(ref reason) if reason.contains("connection reset")
        ));
    }

    #[tokio::test]
    async fn vanished_server_task_is_not_clean() {
        let (tx, rx) = oneshot::channel::<Result<(), String>>();
        drop(tx);
        assert!(matches!(
            drain_outcome(rx.await),
            Err(ShutdownError::Aborted(_))
        ));
    }

    #[tokio::test]
    async fn drained_server_is_clean() {
        let (tx, rx) = oneshot::channel();
        tx.send(Ok(())).unwrap();
        assert!(drain_outcome(rx.await).is_ok());
    }
}
