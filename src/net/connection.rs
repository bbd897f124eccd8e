//! Accepted client connections.
//!
//! # Responsibilities
//! - Hold the accepted stream and peer address
//! - Generate unique connection IDs for log correlation
//! - Release the descriptor on close
//!
//! # Design Decisions
//! - Clients are plain result objects; the server keeps no registry
//! - Closing is explicit and consumes the handle

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::TcpStream;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A connection handed out by [`Server::accept`](crate::net::Server::accept).
#[derive(Debug)]
pub struct Client {
    id: ConnectionId,
    stream: TcpStream,
    peer: SocketAddr,
}

impl Client {
    pub(crate) fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            id: ConnectionId::new(),
            stream,
            peer,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Remote address of the connection.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub(crate) fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Close the connection, releasing its descriptor.
    pub fn close(self) {
        tracing::trace!(connection_id = %self.id, "Connection closed");
        drop(self.stream);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
        assert!(id2.as_u64() > id1.as_u64());
    }

    #[test]
    fn connection_id_display() {
        let id = ConnectionId::new();
        assert_eq!(id.to_string(), format!("conn-{}", id.as_u64()));
    }
}
