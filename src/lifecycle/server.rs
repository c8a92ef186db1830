//! The uniform server abstraction managed by the orchestrator.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors a server can report from `run` or `stop`.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening address could not be acquired.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The serving loop exited with an error.
    #[error("serving loop failed: {0}")]
    Serve(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server could not be assembled before serving.
    #[error("server setup failed: {0}")]
    Setup(String),

    /// The graceful drain did not finish before the deadline and was abandoned.
    #[error("graceful stop did not finish within {0:?}, forced shutdown")]
    ForcedShutdown(Duration),

    /// `run` returned before shutdown was requested.
    #[error("server exited before shutdown was requested")]
    UnexpectedExit,

    /// The task running the server panicked.
    #[error("server task panicked")]
    Panicked,
}

impl ServerError {
    /// Wrap any serving-loop error.
    pub fn serve<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ServerError::Serve(Box::new(err))
    }
}

/// A named unit owning one listener and a start/stop lifecycle.
///
/// `run` and `stop` are called concurrently on the same instance: `run`
/// from the server's own task, `stop` from the orchestrator during teardown.
#[async_trait]
pub trait Server: Send + Sync {
    /// Name used in lifecycle messages and metric labels.
    fn name(&self) -> &str;

    /// Serve until stopped or an unrecoverable fault occurs.
    ///
    /// Returning `Ok(())` means the server exited because `stop` was called.
    /// The token signals shutdown intent; observing it is optional.
    async fn run(&self, token: CancellationToken) -> Result<(), ServerError>;

    /// Gracefully drain. With a deadline, escalates to a forced close once it
    /// expires and reports [`ServerError::ForcedShutdown`].
    async fn stop(&self, deadline: Option<Duration>) -> Result<(), ServerError>;
}
