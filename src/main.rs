//! Service Scaffold
//!
//! Starts the metrics endpoint and, unless disabled, the gRPC endpoint, then
//! coordinates their graceful shutdown.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────┐
//!                 │                 ORCHESTRATOR                  │
//!   SIGTERM ──────┼─▶ signal watcher ──▶ cancel token             │
//!   SIGINT        │                          │                    │
//!                 │        ┌─────────────────┴───────────┐        │
//!                 │        ▼                             ▼        │
//!  scrape :19090 ─┼─▶ MetricsServer (axum)    RpcServer (tonic) ◀─┼─ :50051
//!                 │        │                             │        │
//!                 │        └──── first failure ──────────┘        │
//!                 │                     ▼                         │
//!                 │   stop in registration order → ExitReport     │
//!                 └───────────────────────────────────────────────┘
//! ```
//!
//! Exit status is 0 for a clean shutdown and 1 when any server failed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use service_scaffold::config::{load_config, ScaffoldConfig};
use service_scaffold::observability::{logging, metrics};
use service_scaffold::{build_servers, Orchestrator, ShutdownPolicy};

#[derive(Parser)]
#[command(name = "service-scaffold")]
#[command(about = "Metrics and gRPC health endpoints with coordinated graceful shutdown", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run only the metrics server.
    #[arg(long)]
    metrics_only: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ScaffoldConfig::default(),
    };
    if cli.metrics_only {
        config.grpc.enabled = false;
    }

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "service-scaffold starting");

    let handle = match metrics::install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics recorder");
            return ExitCode::FAILURE;
        }
    };

    let servers = match build_servers(&config, handle) {
        Ok(servers) => servers,
        Err(e) => {
            tracing::error!(error = %e, "Invalid bind address");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        metrics_address = %config.metrics.bind_address,
        grpc_enabled = config.grpc.enabled,
        grpc_address = %config.grpc.bind_address,
        stop_timeout_secs = config.shutdown.stop_timeout_secs,
        "Configuration loaded"
    );

    let orchestrator = match Orchestrator::new(servers, ShutdownPolicy::from(&config.shutdown)) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            tracing::error!(error = %e, "Nothing to run");
            return ExitCode::FAILURE;
        }
    };

    match orchestrator.run().await {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            if let Some(failure) = &report.first_failure {
                tracing::error!(server = %failure.server, error = %failure.error, "Exiting after server failure");
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Orchestrator refused to run");
            ExitCode::FAILURE
        }
    }
}
