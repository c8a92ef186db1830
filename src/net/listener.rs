//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind to a configured address
//! - Classify failures as bind errors so the orchestrator treats them as fatal

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::lifecycle::ServerError;

/// Bind a TCP listener, reporting failure as [`ServerError::Bind`].
pub async fn bind(address: SocketAddr) -> Result<TcpListener, ServerError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::Bind { address, source })?;

    let local_addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { address, source })?;

    tracing::info!(address = %local_addr, "Listener bound");

    Ok(listener)
}
