//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the scaffold.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so that an empty file (or no file) is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the process scaffold.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ScaffoldConfig {
    /// HTTP metrics endpoint.
    pub metrics: MetricsConfig,

    /// gRPC endpoint hosting health and reflection.
    pub grpc: GrpcConfig,

    /// Shutdown sequencing.
    pub shutdown: ShutdownConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Metrics endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Start the metrics server.
    pub enabled: bool,

    /// Bind address (e.g., "0.0.0.0:19090").
    pub bind_address: String,

    /// Path the exposition is served on.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:19090".to_string(),
            path: "/metrics".to_string(),
        }
    }
}

/// gRPC endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GrpcConfig {
    /// Start the gRPC server. Disabled means the metrics-only variant.
    pub enabled: bool,

    /// Bind address (e.g., "0.0.0.0:50051").
    pub bind_address: String,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:50051".to_string(),
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Per-server graceful stop deadline in seconds.
    /// Zero waits for the drain indefinitely.
    pub stop_timeout_secs: u64,
}

impl ShutdownConfig {
    /// The stop deadline, or `None` when unbounded.
    pub fn stop_timeout(&self) -> Option<Duration> {
        (self.stop_timeout_secs > 0).then(|| Duration::from_secs(self.stop_timeout_secs))
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            stop_timeout_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error, off).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}
