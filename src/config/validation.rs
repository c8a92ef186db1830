//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require at least one server
//! - Check bind addresses and paths are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ScaffoldConfig → Result<(), Vec<ValidationError>>
//! - Address collisions are not checked here; they surface as bind failures at run time

use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

use crate::config::schema::ScaffoldConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Both servers are disabled.
    #[error("no server enabled: enable metrics or grpc")]
    NoServers,

    /// A bind address does not parse as `ip:port`.
    #[error("{section}.bind_address '{value}' is not a socket address")]
    InvalidBindAddress { section: &'static str, value: String },

    /// The metrics path is not absolute.
    #[error("metrics.path '{0}' must start with '/'")]
    InvalidMetricsPath(String),

    /// The log level is not recognised.
    #[error("observability.log_level '{0}' is not a known level")]
    InvalidLogLevel(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ScaffoldConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.metrics.enabled && !config.grpc.enabled {
        errors.push(ValidationError::NoServers);
    }

    if config.metrics.enabled {
        check_address("metrics", &config.metrics.bind_address, &mut errors);
        if !config.metrics.path.starts_with('/') {
            errors.push(ValidationError::InvalidMetricsPath(
                config.metrics.path.clone(),
            ));
        }
    }

    if config.grpc.enabled {
        check_address("grpc", &config.grpc.bind_address, &mut errors);
    }

    if config.observability.log_level.parse::<LevelFilter>().is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(section: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            section,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&ScaffoldConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ScaffoldConfig::default();
        config.metrics.bind_address = "localhost".into();
        config.metrics.path = "metrics".into();
        config.grpc.bind_address = "0.0.0.0:notaport".into();
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::InvalidMetricsPath("metrics".into())));
        assert!(errors.contains(&ValidationError::InvalidLogLevel("loud".into())));
    }

    #[test]
    fn test_requires_a_server() {
        let mut config = ScaffoldConfig::default();
        config.metrics.enabled = false;
        config.grpc.enabled = false;

        assert_eq!(validate_config(&config), Err(vec![ValidationError::NoServers]));
    }

    #[test]
    fn test_disabled_server_is_not_checked() {
        let mut config = ScaffoldConfig::default();
        config.grpc.enabled = false;
        config.grpc.bind_address = "garbage".into();

        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_shared_address_is_accepted() {
        // Collisions are a run-time bind failure, not a config error.
        let mut config = ScaffoldConfig::default();
        config.grpc.bind_address = config.metrics.bind_address.clone();

        assert_eq!(validate_config(&config), Ok(()));
    }
}
