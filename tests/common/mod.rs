//! Shared utilities for integration tests.

use std::net::Ipv4Addr;

use cims_server::config::{Port, ServerConfig};
use cims_server::provision::DataPaths;
use tempfile::TempDir;

/// Find a currently free loopback port.
#[allow(dead_code)]
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    listener.local_addr().unwrap().port()
}

/// Loopback configuration on a free port.
#[allow(dead_code)]
pub fn local_config() -> ServerConfig {
    ServerConfig {
        address: Ipv4Addr::LOCALHOST,
        port: Port::try_from(free_port()).unwrap(),
        ..ServerConfig::default()
    }
}

/// A runtime tree in a temp dir whose data directory already exists.
pub fn provisioned_paths() -> (TempDir, DataPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path().join("cims"));
    std::fs::create_dir_all(paths.data()).unwrap();
    (dir, paths)
}

/// A runtime tree in a temp dir that does not exist yet.
#[allow(dead_code)]
pub fn fresh_paths() -> (TempDir, DataPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path().join("cims"));
    (dir, paths)
}
