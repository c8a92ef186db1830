//! gRPC server setup.
//!
//! Hosts exactly two collaborator-provided services: the standard
//! `grpc.health.v1.Health` check and server reflection. No business
//! services are registered here.

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server as TonicServer;
use tonic_health::ServingStatus;

use crate::config::GrpcConfig;
use crate::lifecycle::{DrainControl, Server, ServerError};
use crate::net;

/// gRPC server wrapper.
///
/// Manages the lifecycle of the tonic server, including health and
/// reflection registration and graceful drain.
pub struct RpcServer {
    address: SocketAddr,
    drain: DrainControl,
}

impl RpcServer {
    /// Create a gRPC server bound to `address` when run.
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            drain: DrainControl::new(),
        }
    }

    /// Create a gRPC server from validated configuration.
    pub fn from_config(config: &GrpcConfig) -> Result<Self, AddrParseError> {
        Ok(Self::new(config.bind_address.parse()?))
    }

    /// The configured bind address.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    async fn serve(&self) -> Result<(), ServerError> {
        let (mut health_reporter, health_service) = tonic_health::server::health_reporter();

        let reflection_service = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(tonic_health::pb::FILE_DESCRIPTOR_SET)
            .build_v1()
            .map_err(|e| ServerError::Setup(format!("failed to build reflection service: {e}")))?;

        let listener = net::bind(self.address).await?;
        tracing::info!(address = %self.address, "gRPC server starting");

        // Report NOT_SERVING to health checkers for the duration of the drain.
        let graceful = self.drain.graceful_signal();
        let shutdown = async move {
            graceful.await;
            health_reporter
                .set_service_status("", ServingStatus::NotServing)
                .await;
        };

        TonicServer::builder()
            .add_service(health_service)
            .add_service(reflection_service)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "gRPC server error");
                ServerError::serve(e)
            })?;

        tracing::info!("gRPC server stopped");
        Ok(())
    }
}

#[async_trait]
impl Server for RpcServer {
    fn name(&self) -> &str {
        "grpc"
    }

    async fn run(&self, _token: CancellationToken) -> Result<(), ServerError> {
        self.drain.serve(self.serve()).await
    }

    async fn stop(&self, deadline: Option<Duration>) -> Result<(), ServerError> {
        self.drain.stop(deadline).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let server = RpcServer::from_config(&GrpcConfig::default()).unwrap();
        assert_eq!(server.address(), "0.0.0.0:50051".parse().unwrap());
        assert_eq!(server.name(), "grpc");
    }

    #[tokio::test]
    async fn test_stop_before_run_never_binds() {
        let server = RpcServer::new("127.0.0.1:0".parse().unwrap());
        server.stop(Some(Duration::from_millis(100))).await.unwrap_err();

        // Once stop was requested, run returns without serving.
        server.run(CancellationToken::new()).await.unwrap();
    }
}
