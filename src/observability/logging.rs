//! Structured logging and the server log file.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber (stderr, filter from `RUST_LOG`)
//! - Own the on-disk server log (`[SERVER]` / `[ERROR]` lines)
//! - Mirror every log-file line as a tracing event
//!
//! # Design Decisions
//! - The log file is truncated on every start
//! - `--verbose` raises the stderr filter to `info`, so server lines show up
//!   on stderr as well; errors are always shown
//! - The sink is shared behind a mutex; concurrent writers never interleave
//!   within a line

use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "cims_server=info" } else { "cims_server=warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Error type for log sink writes.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink was closed by [`LogSink::close`].
    #[error("log sink is closed")]
    Closed,

    #[error("log sink write failed: {0}")]
    Io(#[from] io::Error),
}

/// Append-only server log file.
///
/// Cloning shares the same underlying file.
#[derive(Debug, Clone)]
pub struct LogSink {
    file: Arc<Mutex<Option<LineWriter<File>>>>,
}

impl LogSink {
    /// Open (and truncate) the log file at `path`.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(Some(LineWriter::new(file)))),
        })
    }

    /// Record a `[SERVER]` line.
    pub fn server(&self, message: &str) -> Result<(), SinkError> {
        tracing::info!(target: "cims_server::server", "{message}");
        self.write_line("SERVER", message)
    }

    /// Record an `[ERROR]` line.
    pub fn error(&self, message: &str) -> Result<(), SinkError> {
        tracing::error!(target: "cims_server::server", "{message}");
        self.write_line("ERROR", message)
    }

    /// Write `[tag] message` to the file.
    pub fn write_line(&self, tag: &str, message: &str) -> Result<(), SinkError> {
        let mut guard = self.lock();
        let file = guard.as_mut().ok_or(SinkError::Closed)?;
        writeln!(file, "[{tag}] {message}")?;
        Ok(())
    }

    /// Flush and close the file. Later writes fail with [`SinkError::Closed`].
    pub fn close(&self) -> Result<(), SinkError> {
        let mut file = self.lock().take().ok_or(SinkError::Closed)?;
        file.flush()?;
        Ok(())
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> MutexGuard<'_, Option<LineWriter<File>>> {
        // A panic mid-write leaves at worst a partial line; keep logging.
        self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
