//! Configuration schema definitions.
//!
//! This module defines the resolved server configuration and the overrides
//! layer that environment variables and command-line flags are folded into.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

use crate::config::validation::{parse_port, ValidationError};

/// Port the server listens on when nothing overrides it.
pub const DEFAULT_PORT: u16 = 4242;

/// Address the server binds to when nothing overrides it.
pub const DEFAULT_ADDRESS: Ipv4Addr = Ipv4Addr::UNSPECIFIED;

/// Pending-connection queue handed to `listen(2)`.
pub const DEFAULT_BACKLOG: u32 = 0xff;

/// Environment variable overriding the port.
pub const ENV_PORT: &str = "CIMS_PORT";

/// Environment variable overriding the bind address.
pub const ENV_ADDRESS: &str = "CIMS_FALLBACK_ADDR";

/// Environment variable naming the interface to bind to.
pub const ENV_DEVICE: &str = "CIMS_DEVICE";

/// A validated TCP port in `1..=65534`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Port(u16);

impl Port {
    /// Lowest accepted port.
    pub const MIN: u16 = 1;
    /// Highest accepted port.
    pub const MAX: u16 = 65534;

    /// Get the raw port number.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Port {
    type Error = ValidationError;

    fn try_from(port: u16) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&port) {
            Ok(Self(port))
        } else {
            Err(ValidationError::PortOutOfRange(port.to_string()))
        }
    }
}

impl std::str::FromStr for Port {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_port(s)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operating mode selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Default mode, expects an operator front-end.
    #[default]
    Interactive,
    /// No front-end; the daemon only logs.
    Headless,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Interactive => write!(f, "interactive"),
            Mode::Headless => write!(f, "headless"),
        }
    }
}

/// Fully resolved server configuration.
///
/// Immutable once produced by [`resolve`](crate::config::resolve).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// IPv4 address to bind.
    pub address: Ipv4Addr,

    /// Port to bind.
    pub port: Port,

    /// Listen backlog (always > 0).
    pub backlog: u32,

    /// Operating mode.
    pub mode: Mode,

    /// Mirror server log lines to stderr.
    pub verbose: bool,

    /// Restrict the listener to this network interface.
    pub device: Option<String>,
}

impl ServerConfig {
    /// Socket address assembled from `address` and `port`.
    pub fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.address, self.port.get())
    }

    /// Environment assignments that reproduce this configuration.
    pub fn export_env(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{}={}", ENV_PORT, self.port),
            format!("{}={}", ENV_ADDRESS, self.address),
        ];
        if let Some(device) = &self.device {
            lines.push(format!("{}={}", ENV_DEVICE, device));
        }
        lines
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            port: Port(DEFAULT_PORT),
            backlog: DEFAULT_BACKLOG,
            mode: Mode::default(),
            verbose: false,
            device: None,
        }
    }
}

/// One configuration layer: every field is optional and, when set,
/// replaces the value of the layer beneath it.
///
/// Values stay raw strings until resolution so that validation reports
/// exactly what the operator typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub port: Option<String>,
    pub address: Option<String>,
    pub device: Option<String>,
    /// Force the loopback address; wins over `address` in the same layer.
    pub local: bool,
    pub headless: bool,
    pub verbose: bool,
}

impl ConfigOverrides {
    /// Build the environment layer from `(key, value)` pairs.
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut overrides = Self::default();
        for (key, value) in vars {
            match key.as_ref() {
                ENV_PORT => overrides.port = Some(value.into()),
                ENV_ADDRESS => overrides.address = Some(value.into()),
                ENV_DEVICE => overrides.device = Some(value.into()),
                _ => {}
            }
        }
        overrides
    }

    /// Build the environment layer from the current process environment.
    pub fn from_process_env() -> Self {
        Self::from_env_vars(std::env::vars())
    }
}
