//! gRPC subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (tonic, HTTP/2)
//!     → grpc.health.v1.Health / grpc.reflection.v1.ServerReflection
//! ```

pub mod server;

pub use server::RpcServer;
