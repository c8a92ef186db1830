//! Orchestrator state machine and lifecycle events.
//!
//! # State Transitions
//! ```text
//! Starting → Running: every server task has begun its run loop
//! Running → ShuttingDown: termination signal or first server exit
//! ShuttingDown → Stopped: every stop and run has returned
//! ```
//!
//! Strictly linear: no retries, no re-entry to Running.

use std::fmt;

/// Phase of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrchestratorState {
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrchestratorState::Starting => "starting",
            OrchestratorState::Running => "running",
            OrchestratorState::ShuttingDown => "shutting down",
            OrchestratorState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Phase transitions broadcast to subscribers, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A server task is being launched.
    ServerStarting { server: String },
    /// Every server has begun its run loop.
    Running,
    /// A termination request was caught.
    SignalReceived,
    /// A server's run loop failed or exited unexpectedly.
    ServerFailed { server: String, error: String },
    /// Graceful stop of a server is beginning.
    ShutdownStarted { server: String },
    /// A server's stop call returned.
    ShutdownFinished { server: String },
    /// A server's stop call reported an error.
    ShutdownFailed { server: String, error: String },
    /// Teardown completed with the given exit code.
    Stopped { exit_code: i32 },
}
