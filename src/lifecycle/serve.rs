//! The accept loop.
//!
//! # Design Decisions
//! - A failure that only concerns one connection is logged and skipped
//! - Any other accept failure ends the loop with an error
//! - Shutdown cancels the pending accept and hands the server back

use tokio::sync::broadcast;

use crate::net::{Server, ServerError};

/// Accept, greet and close connections until `shutdown` fires.
///
/// Returns the server so the caller can [`stop`](Server::stop) it.
pub async fn serve(
    mut server: Server,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<Server, ServerError> {
    loop {
        let accepted = tokio::select! {
            _ = shutdown.recv() => None,
            accepted = server.accept() => Some(accepted),
        };

        match accepted {
            None => {
                tracing::info!("Shutdown requested, leaving accept loop");
                return Ok(server);
            }
            Some(Ok(client)) => client.close(),
            Some(Err(e)) if e.is_client_error() => server.log_error(&e.to_string())?,
            Some(Err(e)) => {
                let _ = server.log_error(&e.to_string());
                return Err(e);
            }
        }
    }
}
