//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request tracing)
//!     → GET {path} renders the Prometheus registry
//!     → Send to scraper
//! ```

pub mod server;

pub use server::MetricsServer;
