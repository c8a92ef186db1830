//! Process scaffold library.
//!
//! Hosts an HTTP metrics endpoint and an optional gRPC endpoint (health and
//! reflection only) under one lifecycle orchestrator that shuts everything
//! down on SIGTERM/SIGINT or on the first server failure.

// Core subsystems
pub mod config;
pub mod grpc;
pub mod http;
pub mod net;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

use std::net::AddrParseError;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

pub use config::ScaffoldConfig;
pub use grpc::RpcServer;
pub use http::MetricsServer;
pub use lifecycle::{ExitReport, Orchestrator, Server, ShutdownPolicy};

/// Build the enabled servers in registration order: metrics first, then gRPC.
pub fn build_servers(
    config: &ScaffoldConfig,
    handle: PrometheusHandle,
) -> Result<Vec<Arc<dyn Server>>, AddrParseError> {
    let mut servers: Vec<Arc<dyn Server>> = Vec::new();

    if config.metrics.enabled {
        servers.push(Arc::new(MetricsServer::from_config(&config.metrics, handle)?));
    }
    if config.grpc.enabled {
        servers.push(Arc::new(RpcServer::from_config(&config.grpc)?));
    }

    Ok(servers)
}
