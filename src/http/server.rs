//! HTTP metrics server.
//!
//! # Responsibilities
//! - Create the Axum Router serving the Prometheus exposition
//! - Wire up request tracing
//! - Bind to the fixed metrics address and serve until stopped
//! - Drain in-flight scrapes on graceful stop

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::config::MetricsConfig;
use crate::lifecycle::{DrainControl, Server, ServerError};
use crate::net;

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// HTTP server exposing the metrics registry.
pub struct MetricsServer {
    address: SocketAddr,
    path: String,
    handle: PrometheusHandle,
    drain: DrainControl,
}

impl MetricsServer {
    /// Create a metrics server rendering `handle` at `path`.
    pub fn new(address: SocketAddr, path: impl Into<String>, handle: PrometheusHandle) -> Self {
        Self {
            address,
            path: path.into(),
            handle,
            drain: DrainControl::new(),
        }
    }

    /// Create a metrics server from validated configuration.
    pub fn from_config(
        config: &MetricsConfig,
        handle: PrometheusHandle,
    ) -> Result<Self, AddrParseError> {
        Ok(Self::new(
            config.bind_address.parse()?,
            config.path.clone(),
            handle,
        ))
    }

    /// The configured bind address.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Build the Axum router with all middleware layers.
    pub fn router(&self) -> Router {
        Router::new()
            .route(&self.path, get(render_metrics))
            .with_state(self.handle.clone())
            .layer(TraceLayer::new_for_http())
    }
}

#[async_trait]
impl Server for MetricsServer {
    fn name(&self) -> &str {
        "metrics"
    }

    async fn run(&self, _token: CancellationToken) -> Result<(), ServerError> {
        self.drain
            .serve(async {
                let listener = net::bind(self.address).await?;
                tracing::info!(
                    address = %self.address,
                    path = %self.path,
                    "Metrics server starting"
                );

                axum::serve(listener, self.router())
                    .with_graceful_shutdown(self.drain.graceful_signal())
                    .await
                    .map_err(ServerError::serve)?;

                tracing::info!("Metrics server stopped");
                Ok(())
            })
            .await
    }

    async fn stop(&self, deadline: Option<Duration>) -> Result<(), ServerError> {
        self.drain.stop(deadline).await
    }
}

/// Render the current registry snapshot.
async fn render_metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        handle.render(),
    )
}
