//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Server lifecycle events
//!     → LogSink (server.log, [SERVER]/[ERROR] lines)
//!     → tracing events (stderr, filtered by RUST_LOG / --verbose)
//! ```

pub mod logging;

pub use logging::{init_tracing, LogSink, SinkError};
