//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGTERM and SIGINT handlers
//! - Translate the first one into cancellation of the shared token
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The watcher performs exactly one action; teardown lives in the orchestrator
//! - The watcher also exits when the token is cancelled by a server failure
//! - No other signals are handled (no SIGHUP reload)

use std::future::Future;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::state::LifecycleEvent;

/// Resolve when the process receives SIGTERM or an interrupt.
///
/// A handler that cannot be installed is logged and never fires.
pub async fn termination() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for interrupt signal");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => tracing::debug!(signal = "SIGINT", "Termination signal delivered"),
        _ = terminate => tracing::debug!(signal = "SIGTERM", "Termination signal delivered"),
    }
}

/// Wait for `trigger` and cancel `token`, unless the token is cancelled first.
pub(crate) async fn watch<S>(
    trigger: S,
    token: CancellationToken,
    events: broadcast::Sender<LifecycleEvent>,
) where
    S: Future<Output = ()>,
{
    tokio::select! {
        _ = token.cancelled() => {}
        _ = trigger => {
            tracing::info!("Termination signal received, shutting down");
            let _ = events.send(LifecycleEvent::SignalReceived);
            token.cancel();
        }
    }
}
