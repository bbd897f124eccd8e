//! Runtime data directory provisioning.
//!
//! # Data Flow
//! ```text
//! has_data_path()  ── present ──▶ nothing to do
//!       │
//!     absent
//!       ▼
//! Owner::of_current_executable()   (stat of the canonical binary)
//!       ▼
//! ensure_data_path()
//!     → privilege check (root, or already the target owner)
//!     → mkpath.rs   (create each missing component)
//!     → ownership.rs (chown root + every non-hidden directory)
//! ```
//!
//! # Design Decisions
//! - Provisioning failures are fatal to startup; the log file lives here
//! - Directory creation treats "already exists" as success, so reruns are safe
//! - Only directories are re-owned; plain files keep their owner

pub mod mkpath;
pub mod ownership;

use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use nix::unistd::{getegid, geteuid};
use thiserror::Error;

pub use mkpath::make_path;
pub use ownership::chown_tree;

/// Default root of the runtime tree.
pub const DEFAULT_ROOT: &str = "/etc/cims";

/// Errors raised while provisioning the data path.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The effective user may not assign the requested owner.
    #[error("please rerun as superuser! (euid {euid} cannot provision for uid {owner_uid})")]
    NotPrivileged { euid: u32, owner_uid: u32 },

    /// The running executable could not be located or stat'ed.
    #[error("failed to stat executable: {0}")]
    Executable(#[source] io::Error),

    /// A path component could not be created.
    #[error("mkdir {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Walking the tree failed (unreadable directory, vanished entry).
    #[error("cannot walk tree for chown: {0}")]
    Walk(#[from] walkdir::Error),

    /// chown(2) failed.
    #[error("chown {}: {source}", .path.display())]
    Chown {
        path: PathBuf,
        #[source]
        source: nix::errno::Errno,
    },
}

/// On-disk layout of the runtime tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
    data: PathBuf,
    log_file: PathBuf,
}

impl DataPaths {
    /// Layout rooted at `root`: `<root>/data/server.log`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let data = root.join("data");
        let log_file = data.join("server.log");
        Self { root, data, log_file }
    }

    /// Top of the tree; ownership repair starts here.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding runtime data.
    pub fn data(&self) -> &Path {
        &self.data
    }

    /// Server log file.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

/// Owner to assign to the provisioned tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub uid: u32,
    pub gid: u32,
}

impl Owner {
    pub fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }

    /// Owner of the file at `path`.
    pub fn of_path(path: &Path) -> io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self::new(meta.uid(), meta.gid()))
    }

    /// Owner of the running executable, after resolving symlinks.
    pub fn of_current_executable() -> Result<Self, ProvisionError> {
        let exe = std::env::current_exe()
            .and_then(|p| p.canonicalize())
            .map_err(ProvisionError::Executable)?;
        Self::of_path(&exe).map_err(ProvisionError::Executable)
    }

    /// Effective uid/gid of this process.
    pub fn effective() -> Self {
        Self::new(geteuid().as_raw(), getegid().as_raw())
    }
}

/// Whether the data directory already exists.
///
/// Stat errors other than "not found" count as present: provisioning would
/// not fix them and the log-file open will report the real problem.
pub fn has_data_path(paths: &DataPaths) -> bool {
    match std::fs::metadata(paths.data()) {
        Ok(_) => true,
        Err(e) => e.kind() != io::ErrorKind::NotFound,
    }
}

/// Create the data directory and hand the tree to `owner`.
///
/// Safe to call repeatedly.
pub fn ensure_data_path(paths: &DataPaths, owner: Owner) -> Result<(), ProvisionError> {
    let euid = geteuid();
    if !euid.is_root() && euid.as_raw() != owner.uid {
        return Err(ProvisionError::NotPrivileged {
            euid: euid.as_raw(),
            owner_uid: owner.uid,
        });
    }

    make_path(paths.data())?;
    let changed = chown_tree(paths.root(), owner)?;

    tracing::info!(
        path = %paths.data().display(),
        uid = owner.uid,
        gid = owner.gid,
        directories = changed,
        "Data path provisioned"
    );

    Ok(())
}
