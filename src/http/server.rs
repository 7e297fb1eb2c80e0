//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the dispatch handler
//! - Wire up middleware (request ID, tracing, CORS)
//! - Bind server to listener and drain on shutdown
//! - Dispatch each request: liveness, preflight, forward, or 404

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{validation::validate_config, ConfigError, ProxyConfig};
use crate::http::cors::CorsPolicy;
use crate::http::error::ProxyError;
use crate::http::proxy::Forwarder;
use crate::http::request::{MakeRequestUuidV4, RequestIdExt};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::resilience::UpstreamTimeouts;
use crate::routing::{RouteMatch, Router as ProxyRouter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub forwarder: Forwarder,
    pub cors: Arc<CorsPolicy>,
}

/// HTTP server for the upload proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// The configuration is validated here as well, so a server can never be
    /// built from values that would fail per request.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let cors = CorsPolicy::from_config(&config.cors)
            .map_err(|e| ConfigError::Validation(vec![e]))?;

        let state = AppState {
            router: Arc::new(ProxyRouter::from_config(&config.upstream)),
            forwarder: Forwarder::new(UpstreamTimeouts::from_config(&config.timeouts)),
            cors: Arc::new(cors),
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let cors = Arc::clone(&state.cors);
        let app = Router::new().fallback(dispatch).with_state(state);

        cors.apply(app).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request.request_id()
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.origin,
            prefix = %self.config.upstream.public_prefix,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.triggered().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The fully layered router, for driving without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Single entry point for every request.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request.request_id().to_string();

    let (response, outcome) = match state.router.match_request(&method, request.uri()) {
        RouteMatch::Health => ((StatusCode::OK, "ok").into_response(), "health"),
        RouteMatch::Preflight => (state.cors.preflight_response(), "preflight"),
        RouteMatch::NotFound => {
            tracing::debug!(request_id = %request_id, path = %path, "No route matched");
            let err = ProxyError::RouteNotFound(path);
            let outcome = err.outcome();
            (err.into_response(), outcome)
        }
        RouteMatch::Forward(target) => {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                target = %target,
                "Proxying request"
            );

            match state.forwarder.forward(request, &target).await {
                Ok(response) => (response, "forwarded"),
                Err(err) => {
                    match &err {
                        ProxyError::ClientDisconnect => {
                            tracing::info!(request_id = %request_id, "Client disconnected, upstream request aborted")
                        }
                        _ => tracing::error!(request_id = %request_id, target = %target, error = %err, "Upstream error"),
                    }
                    let outcome = err.outcome();
                    (err.into_response(), outcome)
                }
            }
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), outcome, start_time);
    response
}
