//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ScaffoldConfig (validated, immutable)
//!     → consumed once at startup to build servers
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; no file means the fixed ports 19090 and 50051
//! - Validation separates syntactic (serde) from semantic checks
//! - No reload: the process lifetime is the config lifetime

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    GrpcConfig, LogFormat, MetricsConfig, ObservabilityConfig, ScaffoldConfig, ShutdownConfig,
};
pub use validation::ValidationError;
