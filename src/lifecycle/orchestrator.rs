//! Coordinated multi-server lifecycle.
//!
//! # Run Sequence
//! ```text
//! spawn run(token) per server ──┐
//! spawn signal watcher ─────────┤
//!                               ▼
//! Running: wait for first of { any run returns, token cancelled }
//!          (runs returning within the tie window rank by registration order)
//!                               ▼
//! ShuttingDown: cancel token → stop(deadline) each server in registration order
//!                               ▼
//! join all run tasks (bounded by the same deadline) → Stopped → ExitReport
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch, Barrier};
use tokio_util::sync::CancellationToken;

use crate::lifecycle::outcome::ExitReport;
use crate::lifecycle::server::{Server, ServerError};
use crate::lifecycle::shutdown::ShutdownPolicy;
use crate::lifecycle::signals;
use crate::lifecycle::state::{LifecycleEvent, OrchestratorState};
use crate::observability::metrics;

const EVENT_CAPACITY: usize = 64;

/// Run reports arriving this close to the first one count as simultaneous
/// and are ranked by registration order.
const TIE_WINDOW: Duration = Duration::from_millis(5);

/// Errors refusing to start a run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    /// Configured with an empty server list.
    #[error("at least one server must be configured")]
    NoServers,

    /// `run` was already called on this orchestrator.
    #[error("orchestrator already running")]
    AlreadyRunning,
}

/// Result of one server's `run`, tagged with its registration index.
struct RunReport {
    index: usize,
    result: Result<(), ServerError>,
}

/// Brings up a fixed set of servers, waits for a stop condition, and tears
/// them all down, folding every failure into one [`ExitReport`].
///
/// One orchestrator runs once; a second `run` is rejected with
/// [`OrchestratorError::AlreadyRunning`].
pub struct Orchestrator {
    servers: Vec<Arc<dyn Server>>,
    policy: ShutdownPolicy,
    token: CancellationToken,
    launched: AtomicBool,
    state: watch::Sender<OrchestratorState>,
    events: broadcast::Sender<LifecycleEvent>,
}

impl Orchestrator {
    /// Register the servers to manage. Stop order is registration order.
    pub fn new(
        servers: Vec<Arc<dyn Server>>,
        policy: ShutdownPolicy,
    ) -> Result<Self, OrchestratorError> {
        if servers.is_empty() {
            return Err(OrchestratorError::NoServers);
        }

        let (state, _) = watch::channel(OrchestratorState::Starting);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            servers,
            policy,
            token: CancellationToken::new(),
            launched: AtomicBool::new(false),
            state,
            events,
        })
    }

    /// The shared cancellation token. Cancelling it requests shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Current phase.
    pub fn state(&self) -> OrchestratorState {
        *self.state.borrow()
    }

    /// Observe phase changes.
    pub fn watch_state(&self) -> watch::Receiver<OrchestratorState> {
        self.state.subscribe()
    }

    /// Receive lifecycle events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Run until SIGTERM/SIGINT or the first server exit.
    pub async fn run(&self) -> Result<ExitReport, OrchestratorError> {
        self.run_until(signals::termination()).await
    }

    /// Run until `trigger` resolves or the first server exit.
    pub async fn run_until<S>(&self, trigger: S) -> Result<ExitReport, OrchestratorError>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        if self.launched.swap(true, Ordering::SeqCst) {
            return Err(OrchestratorError::AlreadyRunning);
        }

        let count = self.servers.len();
        let (tx, mut reports) = mpsc::unbounded_channel();
        let barrier = Arc::new(Barrier::new(count + 1));
        let live = Arc::new(AtomicUsize::new(count));
        let mut handles = Vec::with_capacity(count);

        for (index, server) in self.servers.iter().enumerate() {
            tracing::info!(server = server.name(), "Starting server");
            self.emit(LifecycleEvent::ServerStarting {
                server: server.name().to_string(),
            });
            handles.push(tokio::spawn(drive(
                index,
                Arc::clone(server),
                self.token.clone(),
                Arc::clone(&barrier),
                Arc::clone(&live),
                tx.clone(),
            )));
        }
        drop(tx);

        let watcher = tokio::spawn(signals::watch(
            trigger,
            self.token.clone(),
            self.events.clone(),
        ));

        barrier.wait().await;
        self.emit(LifecycleEvent::Running);
        self.transition(OrchestratorState::Running);
        metrics::set_servers_running(live.load(Ordering::SeqCst));

        let mut report = ExitReport::default();
        let mut outstanding = vec![true; count];
        let mut batch = Vec::new();

        tokio::select! {
            biased;
            Some(run) = reports.recv() => batch.push(run),
            _ = self.token.cancelled() => {}
        }

        if !batch.is_empty() {
            let requested = self.token.is_cancelled();
            let window = tokio::time::sleep(TIE_WINDOW);
            tokio::pin!(window);
            loop {
                tokio::select! {
                    biased;
                    Some(run) = reports.recv() => batch.push(run),
                    _ = &mut window => break,
                }
            }

            batch.sort_by_key(|run| run.index);
            for run in batch {
                outstanding[run.index] = false;
                self.observe_run(&mut report, run, requested);
            }
            metrics::set_servers_running(live.load(Ordering::SeqCst));
        }

        self.token.cancel();
        self.transition(OrchestratorState::ShuttingDown);
        self.stop_all(&mut report).await;

        let join = async {
            while let Some(run) = reports.recv().await {
                outstanding[run.index] = false;
                self.observe_run(&mut report, run, true);
            }
        };
        let joined = match self.policy.stop_timeout {
            Some(deadline) => tokio::time::timeout(deadline, join).await.is_ok(),
            None => {
                join.await;
                true
            }
        };

        if !joined {
            let deadline = self.policy.stop_timeout.unwrap_or_default();
            for (index, pending) in outstanding.iter().enumerate() {
                if !*pending {
                    continue;
                }
                let name = self.servers[index].name();
                tracing::warn!(
                    server = name,
                    deadline = ?deadline,
                    "Server did not return after stop, aborting"
                );
                handles[index].abort();
                report.record_stop(index, name, ServerError::ForcedShutdown(deadline));
            }
        }

        for handle in handles {
            let _ = handle.await;
        }
        let _ = watcher.await;

        metrics::set_servers_running(0);
        self.transition(OrchestratorState::Stopped);
        let exit_code = report.exit_code();
        self.emit(LifecycleEvent::Stopped { exit_code });
        tracing::info!(exit_code, "Shutdown complete");

        Ok(report)
    }

    /// Stop every server once, sequentially, in registration order.
    async fn stop_all(&self, report: &mut ExitReport) {
        for (index, server) in self.servers.iter().enumerate() {
            let name = server.name();
            tracing::info!(server = name, "Shutting down server gracefully");
            self.emit(LifecycleEvent::ShutdownStarted {
                server: name.to_string(),
            });

            let started = Instant::now();
            if let Err(e) = server.stop(self.policy.stop_timeout).await {
                tracing::error!(server = name, error = %e, "Failed to shut down server gracefully");
                self.emit(LifecycleEvent::ShutdownFailed {
                    server: name.to_string(),
                    error: e.to_string(),
                });
                report.record_stop(index, name, e);
            }
            metrics::record_stop_duration(name, started.elapsed());

            tracing::info!(server = name, "Server shut down");
            self.emit(LifecycleEvent::ShutdownFinished {
                server: name.to_string(),
            });
        }
    }

    fn observe_run(&self, report: &mut ExitReport, run: RunReport, requested: bool) {
        let name = self.servers[run.index].name();

        match report.record_run(run.index, name, run.result, requested) {
            Some(error) => {
                tracing::error!(server = name, error = %error, "Server failed");
                metrics::record_failure(name);
                self.emit(LifecycleEvent::ServerFailed {
                    server: name.to_string(),
                    error,
                });
            }
            None => tracing::debug!(server = name, "Server run loop returned"),
        }
    }

    fn transition(&self, next: OrchestratorState) {
        let previous = self.state.send_replace(next);
        tracing::debug!(from = %previous, to = %next, "Lifecycle transition");
    }

    fn emit(&self, event: LifecycleEvent) {
        let _ = self.events.send(event);
    }
}

/// Task body for one server: wait for all peers, run, report.
async fn drive(
    index: usize,
    server: Arc<dyn Server>,
    token: CancellationToken,
    barrier: Arc<Barrier>,
    live: Arc<AtomicUsize>,
    reports: mpsc::UnboundedSender<RunReport>,
) {
    barrier.wait().await;

    let result = AssertUnwindSafe(server.run(token))
        .catch_unwind()
        .await
        .unwrap_or(Err(ServerError::Panicked));
    live.fetch_sub(1, Ordering::SeqCst);

    let _ = reports.send(RunReport { index, result });
}
