//! Incremental directory creation.

use std::fs::DirBuilder;
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Component, Path, PathBuf};

use crate::provision::ProvisionError;

/// Create `path` one component at a time (`/a`, `/a/b`, `/a/b/c`).
///
/// Components that already exist are skipped; any other failure stops
/// at the offending component.
pub fn make_path(path: &Path) -> Result<(), ProvisionError> {
    let mut prefix = PathBuf::new();

    for component in path.components() {
        prefix.push(component);
        if !matches!(component, Component::Normal(_)) {
            continue;
        }

        match DirBuilder::new().mode(0o777).create(&prefix) {
            Ok(()) => tracing::debug!(path = %prefix.display(), "Created directory"),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(source) => {
                return Err(ProvisionError::CreateDir {
                    path: prefix,
                    source,
                })
            }
        }
    }

    Ok(())
}
