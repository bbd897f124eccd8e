//! Layered configuration resolution.
//!
//! `defaults < environment < arguments`, applied field by field.

use std::net::Ipv4Addr;

use crate::config::interfaces::InterfaceTable;
use crate::config::schema::{ConfigOverrides, Mode, ServerConfig};
use crate::config::validation::{parse_address, parse_port, validate_interface, ValidationError};

/// Which layer a rejected value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Environment,
    Arguments,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layer::Environment => write!(f, "environment"),
            Layer::Arguments => write!(f, "argument"),
        }
    }
}

/// Error type for configuration resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Validation {
        layer: Layer,
        errors: Vec<ValidationError>,
    },
}

impl ConfigError {
    /// All rejected values, in the order they were checked.
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            ConfigError::Validation { errors, .. } => errors,
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Validation { layer, errors } => {
                write!(f, "invalid {} configuration: ", layer)?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Resolve the final server configuration.
///
/// Each layer is fully validated before the next is applied; every bad
/// value in the failing layer is reported, not just the first.
pub fn resolve(
    defaults: ServerConfig,
    env: &ConfigOverrides,
    args: &ConfigOverrides,
    interfaces: &dyn InterfaceTable,
) -> Result<ServerConfig, ConfigError> {
    let config = apply(defaults, env, interfaces)
        .map_err(|errors| ConfigError::Validation { layer: Layer::Environment, errors })?;
    let config = apply(config, args, interfaces)
        .map_err(|errors| ConfigError::Validation { layer: Layer::Arguments, errors })?;

    tracing::debug!(
        address = %config.address,
        port = %config.port,
        backlog = config.backlog,
        mode = %config.mode,
        device = ?config.device,
        "Configuration resolved"
    );

    Ok(config)
}

fn apply(
    mut config: ServerConfig,
    layer: &ConfigOverrides,
    interfaces: &dyn InterfaceTable,
) -> Result<ServerConfig, Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(raw) = &layer.port {
        match parse_port(raw) {
            Ok(port) => config.port = port,
            Err(e) => errors.push(e),
        }
    }

    if layer.local {
        config.address = Ipv4Addr::LOCALHOST;
    } else if let Some(raw) = &layer.address {
        match parse_address(raw) {
            Ok(address) => config.address = address,
            Err(e) => errors.push(e),
        }
    }

    if let Some(raw) = &layer.device {
        match validate_interface(raw, interfaces) {
            Ok(device) => config.device = Some(device),
            Err(e) => errors.push(e),
        }
    }

    if layer.headless {
        config.mode = Mode::Headless;
    }
    if layer.verbose {
        config.verbose = true;
    }

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::interfaces::StaticInterfaces;

    fn table() -> StaticInterfaces {
        StaticInterfaces::new(["lo", "eth0"])
    }

    fn layer(port: Option<&str>, address: Option<&str>) -> ConfigOverrides {
        ConfigOverrides {
            port: port.map(String::from),
            address: address.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_survive_empty_layers() {
        let config = resolve(
            ServerConfig::default(),
            &ConfigOverrides::default(),
            &ConfigOverrides::default(),
            &table(),
        )
        .unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn env_overrides_defaults() {
        let env = layer(Some("9000"), None);
        let config = resolve(ServerConfig::default(), &env, &ConfigOverrides::default(), &table())
            .unwrap();
        assert_eq!(config.port.get(), 9000);
        assert_eq!(config.address, ServerConfig::default().address);
    }

    #[test]
    fn args_override_env() {
        let env = layer(Some("9000"), Some("10.0.0.1"));
        let args = layer(Some("9100"), None);
        let config = resolve(ServerConfig::default(), &env, &args, &table()).unwrap();
        assert_eq!(config.port.get(), 9100);
        assert_eq!(config.address, Ipv4Addr::new(10, 0, 0, 1));
    }

    #[test]
    fn local_wins_over_address() {
        let args = ConfigOverrides {
            address: Some("10.0.0.1".into()),
            local: true,
            ..Default::default()
        };
        let config =
            resolve(ServerConfig::default(), &ConfigOverrides::default(), &args, &table()).unwrap();
        assert_eq!(config.address, Ipv4Addr::LOCALHOST);
    }

    #[test]
    fn bad_env_port_is_fatal() {
        let env = layer(Some("0"), None);
        let err = resolve(ServerConfig::default(), &env, &ConfigOverrides::default(), &table())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { layer: Layer::Environment, .. }));
    }

    #[test]
    fn reports_every_bad_value() {
        let args = ConfigOverrides {
            port: Some("65535".into()),
            address: Some("256.1.1.1".into()),
            device: Some("nope0".into()),
            ..Default::default()
        };
        let err = resolve(ServerConfig::default(), &ConfigOverrides::default(), &args, &table())
            .unwrap_err();
        assert_eq!(err.errors().len(), 3);
        let msg = err.to_string();
        assert!(msg.starts_with("invalid argument configuration"));
        assert!(msg.contains("65535"));
        assert!(msg.contains("256.1.1.1"));
        assert!(msg.contains("nope0"));
    }

    #[test]
    fn device_and_flags() {
        let env = ConfigOverrides {
            device: Some("eth0".into()),
            ..Default::default()
        };
        let args = ConfigOverrides {
            headless: true,
            verbose: true,
            ..Default::default()
        };
        let config = resolve(ServerConfig::default(), &env, &args, &table()).unwrap();
        assert_eq!(config.device.as_deref(), Some("eth0"));
        assert_eq!(config.mode, Mode::Headless);
        assert!(config.verbose);
    }
}
