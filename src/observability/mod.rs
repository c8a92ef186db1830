//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (lifecycle trace lines on stdout)
//!     → metrics.rs (gauges, counters, histograms)
//!
//! Consumers:
//!     → Operators reading stdout / log aggregation
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - One trace line per lifecycle phase transition
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
