//! Griddle Observability Module
//!
//! Structured logging for the Griddle client and its sync engine.
//!
//! # Features
//!
//! - **Multiple Output Formats**: Pretty, JSON, and compact output formats
//! - **Environment-based Filtering**: Dynamic log level control via `RUST_LOG`
//! - **IPC-safe output**: logs go to stderr by default so stdout can carry
//!   request/response traffic
//!
//! # Example
//!
//! ```ignore
//! use griddle_observability::{init_tracing, LogFormat};
//!
//! fn main() {
//!     init_tracing(LogFormat::Pretty, None).unwrap();
//!     tracing::info!("client started");
//! }
//! ```

pub mod config;
pub mod initialization;

pub use config::{LogConfig, LogError, LogFormat, LogOutput};
pub use initialization::{init_tracing, init_tracing_with_config};
