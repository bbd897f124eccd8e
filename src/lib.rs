//! CIMS server library: a minimal TCP listener daemon.

pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod provision;

pub use config::ServerConfig;
pub use lifecycle::Shutdown;
pub use net::{Client, Server, GREETING};
pub use provision::DataPaths;
