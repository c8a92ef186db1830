//! Shutdown coordination for servers.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::config::ShutdownConfig;
use crate::lifecycle::server::ServerError;

/// How long teardown may take before it is forced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownPolicy {
    /// Deadline for each server's `stop` and for the final join.
    /// `None` waits indefinitely.
    pub stop_timeout: Option<Duration>,
}

impl ShutdownPolicy {
    /// Bound every stop by `timeout`.
    pub fn bounded(timeout: Duration) -> Self {
        Self {
            stop_timeout: Some(timeout),
        }
    }

    /// Wait for drains however long they take.
    pub fn unbounded() -> Self {
        Self { stop_timeout: None }
    }
}

impl From<&ShutdownConfig> for ShutdownPolicy {
    fn from(config: &ShutdownConfig) -> Self {
        Self {
            stop_timeout: config.stop_timeout(),
        }
    }
}

/// Graceful/forced stop plumbing shared by the concrete servers.
///
/// `serve` wraps the serving future; `stop` requests a graceful drain and
/// escalates to dropping the serving future once the deadline passes.
#[derive(Debug, Default)]
pub struct DrainControl {
    graceful: CancellationToken,
    forced: CancellationToken,
    finished: CancellationToken,
}

impl DrainControl {
    /// Create a new drain controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Future resolving once a graceful drain is requested.
    /// Hand this to the framework's graceful-shutdown hook.
    pub fn graceful_signal(&self) -> WaitForCancellationFutureOwned {
        self.graceful.clone().cancelled_owned()
    }

    /// Whether `stop` has been called.
    pub fn is_stop_requested(&self) -> bool {
        self.graceful.is_cancelled()
    }

    /// Whether the serving future has returned.
    pub fn is_finished(&self) -> bool {
        self.finished.is_cancelled()
    }

    /// Drive `serving` until it returns or a forced stop abandons it.
    ///
    /// Completion is recorded however this returns, so a concurrent `stop`
    /// never waits on a server that already failed.
    pub async fn serve<F>(&self, serving: F) -> Result<(), ServerError>
    where
        F: Future<Output = Result<(), ServerError>>,
    {
        let _finished = self.finished.clone().drop_guard();

        if self.is_stop_requested() {
            return Ok(());
        }

        tokio::select! {
            biased;
            _ = self.forced.cancelled() => Ok(()),
            result = serving => result,
        }
    }

    /// Request a graceful drain and wait for `serve` to return.
    pub async fn stop(&self, deadline: Option<Duration>) -> Result<(), ServerError> {
        self.graceful.cancel();

        let Some(deadline) = deadline else {
            self.finished.cancelled().await;
            return Ok(());
        };

        match tokio::time::timeout(deadline, self.finished.cancelled()).await {
            Ok(()) => Ok(()),
            Err(_) => {
                self.forced.cancel();
                Err(ServerError::ForcedShutdown(deadline))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_graceful_stop_waits_for_drain() {
        let drain = Arc::new(DrainControl::new());

        let serving = drain.clone();
        let task = tokio::spawn(async move {
            let signal = serving.graceful_signal();
            serving
                .serve(async move {
                    signal.await;
                    // In-flight work finishing.
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(())
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!drain.is_finished());

        drain.stop(None).await.unwrap();
        assert!(drain.is_finished());
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_deadline_forces_shutdown() {
        let drain = Arc::new(DrainControl::new());

        let serving = drain.clone();
        let task = tokio::spawn(async move {
            serving
                .serve(std::future::pending::<Result<(), ServerError>>())
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        let err = drain.stop(Some(Duration::from_millis(30))).await.unwrap_err();
        assert!(matches!(err, ServerError::ForcedShutdown(d) if d == Duration::from_millis(30)));

        // The abandoned serving loop returns once forced.
        task.await.unwrap().unwrap();
        assert!(drain.is_finished());
    }

    #[tokio::test]
    async fn test_stop_before_serve_skips_serving() {
        let drain = DrainControl::new();
        let stopping = drain.stop(Some(Duration::from_millis(200)));

        let serving = drain.serve(async { Err(ServerError::Setup("served after stop".into())) });

        let (stopped, served) = tokio::join!(stopping, serving);
        stopped.unwrap();
        served.unwrap();
    }

    #[tokio::test]
    async fn test_failed_serve_releases_stop() {
        let drain = DrainControl::new();
        let result = drain
            .serve(async { Err(ServerError::Setup("boom".into())) })
            .await;
        assert!(matches!(result, Err(ServerError::Setup(_))));

        // Already finished: stop returns immediately even without a deadline.
        drain.stop(None).await.unwrap();
    }

    #[test]
    fn test_policy_from_config() {
        let config = ShutdownConfig {
            stop_timeout_secs: 5,
        };
        assert_eq!(
            ShutdownPolicy::from(&config),
            ShutdownPolicy::bounded(Duration::from_secs(5))
        );

        let config = ShutdownConfig {
            stop_timeout_secs: 0,
        };
        assert_eq!(ShutdownPolicy::from(&config), ShutdownPolicy::unbounded());
    }
}
