//! Configuration validation.
//!
//! # Responsibilities
//! - Parse raw port strings into [`Port`] (1..=65534)
//! - Parse raw addresses as IPv4 dotted-quads
//! - Check interface names against the live interface table
//!
//! # Design Decisions
//! - Validation is a set of pure functions over raw strings
//! - Invalid values are errors, never silently replaced by defaults

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::config::interfaces::InterfaceTable;
use crate::config::schema::Port;

/// A single rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Port is not a number.
    #[error("{0} is not a valid port")]
    PortNotNumeric(String),

    /// Port is 0 or above 65534.
    #[error("{0} is not a valid port (expected 1..=65534)")]
    PortOutOfRange(String),

    /// Address is not an IPv4 dotted-quad.
    #[error("{0} is not a valid ip address")]
    BadAddress(String),

    /// No interface with this name exists.
    #[error("{0} is not a valid interface")]
    UnknownInterface(String),

    /// The interface table could not be read.
    #[error("failed to read interface table: {0}")]
    InterfaceLookup(String),
}

/// Parse a port, rejecting 0, 65535 and anything non-numeric.
pub fn parse_port(raw: &str) -> Result<Port, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::PortNotNumeric(raw.to_string()));
    }
    // All digits: overflow is the only remaining parse failure.
    let value: u32 = trimmed
        .parse()
        .map_err(|_| ValidationError::PortOutOfRange(raw.to_string()))?;
    u16::try_from(value)
        .ok()
        .and_then(|port| Port::try_from(port).ok())
        .ok_or_else(|| ValidationError::PortOutOfRange(raw.to_string()))
}

/// Parse a strict IPv4 dotted-quad.
pub fn parse_address(raw: &str) -> Result<Ipv4Addr, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::BadAddress(raw.to_string()))
}

/// Ensure `name` is present in the interface table.
pub fn validate_interface(
    name: &str,
    interfaces: &dyn InterfaceTable,
) -> Result<String, ValidationError> {
    let names = interfaces
        .names()
        .map_err(|e| ValidationError::InterfaceLookup(e.to_string()))?;

    if names.iter().any(|n| n == name) {
        Ok(name.to_string())
    } else {
        Err(ValidationError::UnknownInterface(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::interfaces::StaticInterfaces;

    #[test]
    fn port_edges() {
        assert!(matches!(parse_port("0"), Err(ValidationError::PortOutOfRange(_))));
        assert!(matches!(parse_port("65535"), Err(ValidationError::PortOutOfRange(_))));
        assert!(matches!(parse_port("99999999999"), Err(ValidationError::PortOutOfRange(_))));
        assert_eq!(parse_port("1").unwrap().get(), 1);
        assert_eq!(parse_port("65534").unwrap().get(), 65534);
    }

    #[test]
    fn port_rejects_garbage() {
        for raw in ["", "abc", "80a", "-1", "8.0"] {
            assert!(
                matches!(parse_port(raw), Err(ValidationError::PortNotNumeric(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn address_validation() {
        assert!(parse_address("256.1.1.1").is_err());
        assert!(parse_address("localhost").is_err());
        assert!(parse_address("1.2.3").is_err());
        assert_eq!(parse_address("127.0.0.1").unwrap(), Ipv4Addr::LOCALHOST);
        assert_eq!(parse_address("0.0.0.0").unwrap(), Ipv4Addr::UNSPECIFIED);
    }

    #[test]
    fn interface_lookup() {
        let table = StaticInterfaces::new(["lo", "eth0"]);
        assert_eq!(validate_interface("eth0", &table).unwrap(), "eth0");
        assert_eq!(
            validate_interface("wlan9", &table),
            Err(ValidationError::UnknownInterface("wlan9".into()))
        );
    }
}
