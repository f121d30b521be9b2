//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the notification and health handlers
//! - Wire up middleware (panic recovery, request ID, tracing, timeout, body limit)
//! - Log every request at INFO with status, latency and client address
//! - Serve on a listener until the shutdown coordinator fires, then drain

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::config::ServiceConfig;
use crate::health::health_handler;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestExt};
use crate::net::ListenerError;
use crate::notification::{DecodeMode, Dispatcher, NotificationSink};

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the notification receiver.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a server handing accepted notifications to `sink`.
    pub fn with_sink(config: ServiceConfig, sink: Arc<dyn NotificationSink>) -> Self {
        let mode = if config.security.strict_validation {
            DecodeMode::Strict
        } else {
            DecodeMode::Lenient
        };
        let state = AppState {
            dispatcher: Arc::new(Dispatcher::new(sink, mode)),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/gke", post(gke_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(
                ServiceBuilder::new()
                    .layer(CatchPanicLayer::new())
                    .layer(set_request_id_layer())
                    .layer(
                        TraceLayer::new_for_http()
                            .make_span_with(|request: &Request<Body>| {
                                tracing::info_span!(
                                    "http_request",
                                    method = %request.method(),
                                    path = %request.uri().path(),
                                    request_id = %request.request_id(),
                                    client_ip = request.client_ip().map(tracing::field::display),
                                )
                            })
                            .on_response(
                                DefaultOnResponse::new()
                                    .level(Level::INFO)
                                    .latency_unit(LatencyUnit::Millis),
                            ),
                    )
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(config.request_timeout())),
            )
    }

    /// The fully layered router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns `Ok(())` once `shutdown` has fired and in-flight requests have
    /// drained.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Serve)?;
        tracing::info!(
            address = %addr,
            strict_validation = self.config.security.strict_validation,
            "HTTP server starting"
        );

        let service = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, service)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining in-flight requests");
            })
            .await
            .map_err(ListenerError::Serve)?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `POST /gke`: one push-delivered cluster notification.
async fn gke_handler(State(state): State<AppState>, body: Bytes) -> Response {
    match state.dispatcher.handle_body(&body) {
        Ok(accepted) => {
            tracing::debug!(event_type = %accepted.kind, "Notification accepted");
            StatusCode::OK.into_response()
        }
        Err(rejection) => rejection.into_response(),
    }
}
