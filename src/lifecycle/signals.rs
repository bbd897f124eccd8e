//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT / SIGTERM
//! - Translate either into a [`Shutdown`] trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)

use tokio::signal::unix::{signal, SignalKind};

use crate::lifecycle::Shutdown;

/// Resolve once SIGINT or SIGTERM arrives.
pub async fn wait_for_termination() -> std::io::Result<&'static str> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    };
    Ok(name)
}

/// Spawn a task that triggers `shutdown` on the first termination signal.
pub fn spawn_signal_listener(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_termination().await {
            Ok(name) => {
                tracing::info!(signal = name, "Termination signal received");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to install signal handlers"),
        }
    })
}
