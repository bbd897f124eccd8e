//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve config → Provision data path → Open log → Bind → Listen
//!
//! Serving (serve.rs):
//!     Accept → Greet → Close, until shutdown
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Leave accept loop → Stop server (close socket + log)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then filesystem, then listener
//! - Ordered shutdown: stop accepting, close socket, close log

pub mod serve;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use serve::serve;
pub use shutdown::Shutdown;
pub use startup::{configure, start, StartupError};
