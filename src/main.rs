//! CIMS server daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   defaults ─┐
//!   env ──────┼─▶ config::resolve ─▶ ServerConfig
//!   args ─────┘                          │
//!                                        ▼
//!            provision (first launch) ─▶ net::Server::start ─▶ Listening
//!                                        │
//!     Client ◀── "connection successful!" ── lifecycle::serve (accept loop)
//!                                        │
//!                      SIGINT/SIGTERM ─▶ Server::stop (socket + log closed)
//! ```

use std::process::ExitCode;

use clap::Parser;

use cims_server::cli::Cli;
use cims_server::config::{ConfigOverrides, InterfaceTable, SystemInterfaces};
use cims_server::lifecycle::{self, signals, Shutdown};
use cims_server::observability::init_tracing;
use cims_server::DataPaths;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list {
        return list_interfaces();
    }

    let env = ConfigOverrides::from_process_env();

    if cli.export_env {
        return export_env(&cli, &env);
    }

    // Verbose is an argument-layer flag only, so the filter is known before resolving.
    init_tracing(cli.verbose);

    match run(&cli, &env).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, env: &ConfigOverrides) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("cims-server v{} starting", env!("CARGO_PKG_VERSION"));

    let server = lifecycle::start(&cli.overrides(), env, &SystemInterfaces, &DataPaths::default()).await?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown.clone());

    let server = lifecycle::serve(server, shutdown_rx).await?;
    server.stop()?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn export_env(cli: &Cli, env: &ConfigOverrides) -> ExitCode {
    match lifecycle::configure(&cli.overrides(), env, &SystemInterfaces) {
        Ok(config) => {
            for line in config.export_env() {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("[ERROR] {e}");
            ExitCode::FAILURE
        }
    }
}

fn list_interfaces() -> ExitCode {
    match SystemInterfaces.names() {
        Ok(names) => {
            for name in names {
                println!("{name}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("[ERROR] cannot list interfaces: {e}");
            ExitCode::FAILURE
        }
    }
}
