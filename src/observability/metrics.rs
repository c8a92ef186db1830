//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Install the process-wide Prometheus recorder
//! - Define lifecycle metrics
//!
//! # Metrics
//! - `scaffold_servers_running` (gauge): servers currently in their run loop
//! - `scaffold_server_failures_total` (counter): run-phase failures by server
//! - `scaffold_server_stop_duration_seconds` (histogram): time spent in `stop` by server
//!
//! # Design Decisions
//! - The recorder is installed once by the binary; without it the macros are no-ops
//! - The exposition handle is handed to the metrics server, which only renders it

use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_gauge!(
        "scaffold_servers_running",
        "Servers currently in their run loop"
    );
    metrics::describe_counter!(
        "scaffold_server_failures_total",
        "Run-phase server failures"
    );
    metrics::describe_histogram!(
        "scaffold_server_stop_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent stopping each server"
    );

    Ok(handle)
}

/// A handle to a private recorder that is not installed globally.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

/// Set the number of running servers.
pub fn set_servers_running(count: usize) {
    gauge!("scaffold_servers_running").set(count as f64);
}

/// Count a run-phase failure.
pub fn record_failure(server: &str) {
    counter!("scaffold_server_failures_total", "server" => server.to_string()).increment(1);
}

/// Record how long a server took to stop.
pub fn record_stop_duration(server: &str, elapsed: Duration) {
    histogram!("scaffold_server_stop_duration_seconds", "server" => server.to_string())
        .record(elapsed.as_secs_f64());
}
