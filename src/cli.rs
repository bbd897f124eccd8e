//! Command-line interface.
//!
//! One ordered option table; values are kept raw and validated during
//! configuration resolution so argument and environment errors read alike.

use clap::Parser;

use crate::config::ConfigOverrides;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "cims-server")]
#[command(version, about = "Minimal TCP listener daemon", long_about = None)]
pub struct Cli {
    /// Run the server in headless mode
    #[arg(long)]
    pub headless: bool,

    /// Run the server locally (bind to 127.0.0.1)
    #[arg(long)]
    pub local: bool,

    /// List all available network interfaces
    #[arg(long)]
    pub list: bool,

    /// Specify an address on which the server runs
    #[arg(long, value_name = "IPV4")]
    pub address: Option<String>,

    /// Set logging to max output
    #[arg(long)]
    pub verbose: bool,

    /// Specify a port on which the server listens
    #[arg(long, value_name = "1-65534")]
    pub port: Option<String>,

    /// Specify a network device on which the server listens
    #[arg(long, value_name = "IFNAME")]
    pub device: Option<String>,

    /// Export only the environment variables for the system
    #[arg(long = "export_env")]
    pub export_env: bool,
}

impl Cli {
    /// The argument configuration layer.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port.clone(),
            address: self.address.clone(),
            device: self.device.clone(),
            local: self.local,
            headless: self.headless,
            verbose: self.verbose,
        }
    }
}
