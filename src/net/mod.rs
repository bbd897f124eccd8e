//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, log peer, send greeting)
//!     → connection.rs (Client handle, returned to the caller)
//!     → caller closes the client
//!
//! Server States:
//!     Unconfigured → Configured → Bound → Listening → Accepting → Stopped
//! ```
//!
//! # Design Decisions
//! - One accept pending at a time; each client is greeted inline
//! - Clients are not tracked by the server

pub mod connection;
pub mod listener;

pub use connection::{Client, ConnectionId};
pub use listener::{Server, ServerError, ServerState, GREETING};
