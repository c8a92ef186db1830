//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured bind address
//!     → listener.rs (bind, classify failure)
//!     → Hand off to the HTTP or gRPC serving loop
//! ```
//!
//! # Design Decisions
//! - Ports are fixed configuration, never chosen dynamically
//! - Collisions are detected here, at run time, not during config validation

pub mod listener;

pub use listener::bind;
