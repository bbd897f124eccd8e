//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration (defaults < environment < arguments)
//! - Provision the data path, open the log, bind and listen
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Steps run in order, not concurrently
//! - The listener starts last (traffic only when ready)

use thiserror::Error;

use crate::config::{self, ConfigError, ConfigOverrides, InterfaceTable, ServerConfig};
use crate::net::{Server, ServerError};
use crate::provision::DataPaths;

/// Error type for startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Resolve the server configuration from the built-in defaults and the
/// given environment and argument layers.
pub fn configure(
    args: &ConfigOverrides,
    env: &ConfigOverrides,
    interfaces: &dyn InterfaceTable,
) -> Result<ServerConfig, ConfigError> {
    config::resolve(ServerConfig::default(), env, args, interfaces)
}

/// Resolve configuration and bring the server up to `Listening`.
pub async fn start(
    args: &ConfigOverrides,
    env: &ConfigOverrides,
    interfaces: &dyn InterfaceTable,
    paths: &DataPaths,
) -> Result<Server, StartupError> {
    let config = configure(args, env, interfaces)?;
    Ok(Server::start(config, paths).await?)
}
