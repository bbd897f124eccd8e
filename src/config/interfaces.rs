//! Network interface enumeration.

use std::io;

/// Source of network interface names.
pub trait InterfaceTable {
    /// Names of all interfaces currently known to the system.
    fn names(&self) -> io::Result<Vec<String>>;
}

/// The live interface table, read via `if_nameindex(3)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceTable for SystemInterfaces {
    fn names(&self) -> io::Result<Vec<String>> {
        let interfaces = nix::net::if_::if_nameindex().map_err(io::Error::from)?;
        Ok(interfaces
            .iter()
            .map(|iface| iface.name().to_string_lossy().into_owned())
            .collect())
    }
}

/// A fixed interface table.
#[derive(Debug, Clone, Default)]
pub struct StaticInterfaces(Vec<String>);

impl StaticInterfaces {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}

impl InterfaceTable for StaticInterfaces {
    fn names(&self) -> io::Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_table_is_readable() {
        let names = SystemInterfaces.names().unwrap();
        assert!(!names.is_empty());
    }
}
