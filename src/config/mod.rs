//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults (ServerConfig::default)
//!     → environment layer (CIMS_PORT, CIMS_FALLBACK_ADDR, CIMS_DEVICE)
//!     → argument layer (--port, --address, --local, --device, ...)
//!     → resolver.rs (apply layers, validation.rs per field)
//!     → ServerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved
//! - Layer order is fixed; later layers win field by field
//! - Any invalid value is fatal, never silently defaulted

pub mod interfaces;
pub mod resolver;
pub mod schema;
pub mod validation;

pub use interfaces::{InterfaceTable, StaticInterfaces, SystemInterfaces};
pub use resolver::{resolve, ConfigError, Layer};
pub use schema::{ConfigOverrides, Mode, Port, ServerConfig};
pub use validation::ValidationError;
