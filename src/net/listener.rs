//! The listening server and its lifecycle state machine.
//!
//! # Responsibilities
//! - Provision the data path when it is missing
//! - Open the server log, create/bind/listen the socket
//! - Accept connections and send the greeting
//! - Tear everything down on stop
//!
//! # States
//! ```text
//! Unconfigured → Configured → Bound → Listening → Accepting → Stopped
//! ```
//!
//! # Design Decisions
//! - Every startup failure names the operation that failed
//! - `accept` takes `&mut self`: at most one accept is pending at a time
//! - `stop` consumes the server, so it cannot run twice

use std::io;
use std::net::{SocketAddr, SocketAddrV4};
use std::path::PathBuf;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpSocket};

use crate::config::{Mode, ServerConfig};
use crate::net::connection::Client;
use crate::observability::{LogSink, SinkError};
use crate::provision::{self, DataPaths, Owner, ProvisionError};

/// Message written to every accepted connection.
pub const GREETING: &str = "connection successful!";

/// Lifecycle state of a [`Server`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Unconfigured,
    Configured,
    Bound,
    Listening,
    Accepting,
    Stopped,
}

/// Error type for server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("cannot open server log {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("socket: {0}")]
    Socket(#[source] io::Error),

    #[error("setsockopt(SO_REUSEADDR): {0}")]
    ReuseAddr(#[source] io::Error),

    #[error("bind to device {device}: {source}")]
    BindDevice {
        device: String,
        #[source]
        source: io::Error,
    },

    #[error("bind {addr}: {source}")]
    Bind {
        addr: SocketAddrV4,
        #[source]
        source: io::Error,
    },

    #[error("listen: {0}")]
    Listen(#[source] io::Error),

    #[error("accept: {0}")]
    Accept(#[source] io::Error),

    #[error("sending greeting to {peer}: {source}")]
    Greeting {
        peer: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl ServerError {
    /// Whether the error only concerns a single connection, leaving the
    /// listener usable.
    pub fn is_client_error(&self) -> bool {
        match self {
            ServerError::Greeting { .. } => true,
            ServerError::Accept(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset
            ),
            _ => false,
        }
    }
}

/// A bound, listening TCP server.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    listener: TcpListener,
    sink: LogSink,
    state: ServerState,
}

impl Server {
    /// Bring a server up from a resolved configuration.
    ///
    /// Provisions `paths` first when its data directory does not exist yet.
    pub async fn start(config: ServerConfig, paths: &DataPaths) -> Result<Self, ServerError> {
        let mut state = ServerState::Unconfigured;
        advance(&mut state, ServerState::Configured);

        if !provision::has_data_path(paths) {
            let owner = Owner::of_current_executable()?;
            provision::ensure_data_path(paths, owner)?;
        }

        let sink = LogSink::open(paths.log_file()).map_err(|source| ServerError::LogFile {
            path: paths.log_file().to_path_buf(),
            source,
        })?;

        if config.mode == Mode::Headless {
            sink.server(&format!("set mode to: {}", config.mode))?;
        }

        let socket = TcpSocket::new_v4().map_err(ServerError::Socket)?;
        socket.set_reuseaddr(true).map_err(ServerError::ReuseAddr)?;

        if let Some(device) = &config.device {
            bind_device(&socket, device)?;
            sink.server(&format!("restricted to device {device}"))?;
        }

        let addr = config.socket_addr();
        socket
            .bind(SocketAddr::V4(addr))
            .map_err(|source| ServerError::Bind { addr, source })?;
        advance(&mut state, ServerState::Bound);

        let listener = socket.listen(config.backlog).map_err(ServerError::Listen)?;
        advance(&mut state, ServerState::Listening);

        let local_addr = listener.local_addr().map_err(ServerError::Listen)?;
        sink.server(&format!("server running on {}:{}", local_addr.ip(), local_addr.port()))?;

        tracing::info!(
            address = %local_addr,
            backlog = config.backlog,
            log_file = %paths.log_file().display(),
            "Listener bound"
        );

        Ok(Self {
            config,
            listener,
            sink,
            state,
        })
    }

    /// Wait for the next connection and greet it.
    ///
    /// The greeting has been written by the time the client is returned.
    pub async fn accept(&mut self) -> Result<Client, ServerError> {
        advance(&mut self.state, ServerState::Accepting);

        let (stream, peer) = self.listener.accept().await.map_err(ServerError::Accept)?;
        let mut client = Client::new(stream, peer);

        tracing::debug!(connection_id = %client.id(), peer_addr = %peer, "Connection accepted");
        self.sink.server(&format!("connection from {}", peer.ip()))?;
        self.send(&mut client, GREETING).await?;

        Ok(client)
    }

    async fn send(&self, client: &mut Client, message: &str) -> Result<(), ServerError> {
        self.sink.server(&format!("sending message:\"{message}\""))?;

        let peer = client.peer_addr();
        let stream = client.stream_mut();
        stream
            .write_all(message.as_bytes())
            .await
            .map_err(|source| ServerError::Greeting { peer, source })?;
        stream
            .flush()
            .await
            .map_err(|source| ServerError::Greeting { peer, source })
    }

    /// Log shutdown, close the socket and the server log.
    pub fn stop(self) -> Result<(), ServerError> {
        let Self {
            listener,
            sink,
            mut state,
            ..
        } = self;

        let logged = sink.server("shutting down...");
        drop(listener);
        advance(&mut state, ServerState::Stopped);

        sink.close()?;
        logged?;
        Ok(())
    }

    /// Record an `[ERROR]` line in the server log.
    pub fn log_error(&self, message: &str) -> Result<(), ServerError> {
        Ok(self.sink.error(message)?)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Get the local address this server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, io::Error> {
        self.listener.local_addr()
    }

    /// Handle to the server log; stays valid (but closed) after `stop`.
    pub fn log_sink(&self) -> LogSink {
        self.sink.clone()
    }
}

fn advance(state: &mut ServerState, next: ServerState) {
    if *state != next {
        tracing::trace!(from = ?*state, to = ?next, "Server state transition");
        *state = next;
    }
}

#[cfg(any(target_os = "android", target_os = "fuchsia", target_os = "linux"))]
fn bind_device(socket: &TcpSocket, device: &str) -> Result<(), ServerError> {
    socket
        .bind_device(Some(device.as_bytes()))
        .map_err(|source| ServerError::BindDevice {
            device: device.to_string(),
            source,
        })
}

#[cfg(not(any(target_os = "android", target_os = "fuchsia", target_os = "linux")))]
fn bind_device(_socket: &TcpSocket, device: &str) -> Result<(), ServerError> {
    Err(ServerError::BindDevice {
        device: device.to_string(),
        source: io::Error::new(io::ErrorKind::Unsupported, "SO_BINDTODEVICE is Linux-only"),
    })
}
