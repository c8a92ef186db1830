//! Shared utilities for lifecycle and server tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use service_scaffold::lifecycle::{
    ExitReport, Orchestrator, OrchestratorError, OrchestratorState, Server, ServerError,
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Names of servers in the order their `stop` was called.
pub type StopLog = Arc<Mutex<Vec<String>>>;

pub fn stop_log() -> StopLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// How a fake server's `run` behaves.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Serve until `stop` is called, then return `Ok`.
    UntilStopped,
    /// Fail after the delay, regardless of `stop`.
    FailAfter(Duration),
    /// Return `Ok` after the delay without being asked to.
    ExitAfter(Duration),
    /// Never return.
    IgnoreStop,
    /// Panic immediately.
    Panic,
}

/// A server that simulates delay, failure and slow drain without a network.
pub struct FakeServer {
    name: String,
    behavior: Behavior,
    drain_time: Duration,
    stop_fails: bool,
    stopped: CancellationToken,
    log: StopLog,
}

impl FakeServer {
    pub fn new(name: &str, behavior: Behavior, log: &StopLog) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            drain_time: Duration::ZERO,
            stop_fails: false,
            stopped: CancellationToken::new(),
            log: log.clone(),
        }
    }

    /// Make `stop` take this long.
    pub fn with_drain_time(mut self, drain_time: Duration) -> Self {
        self.drain_time = drain_time;
        self
    }

    /// Make `stop` report an error after draining.
    pub fn with_failing_stop(mut self) -> Self {
        self.stop_fails = true;
        self
    }

    pub fn shared(self) -> Arc<dyn Server> {
        Arc::new(self)
    }
}

#[async_trait]
impl Server for FakeServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _token: CancellationToken) -> Result<(), ServerError> {
        match self.behavior {
            Behavior::UntilStopped => {
                self.stopped.cancelled().await;
                Ok(())
            }
            Behavior::FailAfter(delay) => {
                tokio::time::sleep(delay).await;
                Err(ServerError::Setup(format!("{} failed", self.name)))
            }
            Behavior::ExitAfter(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Behavior::IgnoreStop => {
                std::future::pending::<()>().await;
                Ok(())
            }
            Behavior::Panic => panic!("{} exploded", self.name),
        }
    }

    async fn stop(&self, _deadline: Option<Duration>) -> Result<(), ServerError> {
        self.log.lock().unwrap().push(self.name.clone());
        tokio::time::sleep(self.drain_time).await;
        self.stopped.cancel();

        if self.stop_fails {
            Err(ServerError::Setup(format!("{} drain failed", self.name)))
        } else {
            Ok(())
        }
    }
}

pub fn stopped(log: &StopLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Run the orchestrator in the background with a manual termination trigger.
pub fn spawn_with_trigger(
    orchestrator: &Arc<Orchestrator>,
) -> (
    JoinHandle<Result<ExitReport, OrchestratorError>>,
    oneshot::Sender<()>,
) {
    let (trigger_tx, trigger_rx) = oneshot::channel::<()>();
    let orchestrator = orchestrator.clone();
    let handle = tokio::spawn(async move {
        orchestrator
            .run_until(async move {
                let _ = trigger_rx.await;
            })
            .await
    });
    (handle, trigger_tx)
}

/// Wait until the orchestrator reports `Running`.
pub async fn wait_until_running(orchestrator: &Orchestrator) {
    let mut state = orchestrator.watch_state();
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == OrchestratorState::Running),
    )
    .await
    .expect("orchestrator did not reach Running")
    .expect("state channel closed");
}

/// A currently free loopback address.
pub fn free_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Two distinct free loopback addresses.
pub fn free_addr_pair() -> (SocketAddr, SocketAddr) {
    let first = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let second = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    (first.local_addr().unwrap(), second.local_addr().unwrap())
}

/// Wait until something accepts connections on `addr`.
pub async fn wait_until_listening(addr: SocketAddr) {
    for _ in 0..100 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("nothing listening on {}", addr);
}
