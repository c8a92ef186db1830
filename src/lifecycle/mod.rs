//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (orchestrator.rs):
//!     Spawn every server's run loop → Running
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → cancel shared token
//!
//! Shutdown (orchestrator.rs, shutdown.rs):
//!     Token cancelled or server exited → stop each server in order
//!     → join run loops → ExitReport (outcome.rs)
//! ```
//!
//! # Design Decisions
//! - Fail fast: any server failure brings the whole process down
//! - Ordered shutdown: sequential, registration order
//! - Shutdown has timeout: forced close after deadline, reported as a failure

pub mod orchestrator;
pub mod outcome;
pub mod server;
pub mod shutdown;
pub mod signals;
pub mod state;

pub use orchestrator::{Orchestrator, OrchestratorError};
pub use outcome::{ExitReport, ServerFailure};
pub use server::{Server, ServerError};
pub use shutdown::{DrainControl, ShutdownPolicy};
pub use state::{LifecycleEvent, OrchestratorState};
