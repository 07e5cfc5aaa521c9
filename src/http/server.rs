//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the avatar and health handlers
//! - Wire up middleware (CORS header, request ID, tracing, panic capture)
//! - Build the shared upstream client and rasterizer once
//! - Bind server to listener and drain on shutdown

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, header::InvalidHeaderValue, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::avatar::avatar_handler;
use crate::http::error::SERVER_ERROR;
use crate::raster::{RasterError, Rasterizer};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub rasterizer: Arc<Rasterizer>,
    pub cache_control: HeaderValue,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ServerError> {
        Ok(Self {
            upstream: UpstreamClient::new(&config.upstream)?,
            rasterizer: Arc::new(Rasterizer::new(&config.raster)?),
            cache_control: HeaderValue::from_str(&config.response.cache_control())?,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        })
    }
}

/// Errors that prevent the server from being built.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("upstream setup failed: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("rasterizer setup failed: {0}")]
    Raster(#[from] RasterError),

    #[error("invalid cache-control value: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// HTTP server for the avatar proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;
        Ok(Self::with_state(config, state))
    }

    /// Create a server around pre-built state.
    pub fn with_state(config: ProxyConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let route = config.response.route.as_str();
        let mut router = Router::new().route(route, any(avatar_handler));
        if route != "/" {
            router = router.route("/", any(avatar_handler));
        }

        router
            .route("/healthz", get(health_handler))
            .with_state(state)
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            route = %self.config.response.route,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Map a handler panic onto the plain-text 500.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %detail, "Handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR).into_response()
}
