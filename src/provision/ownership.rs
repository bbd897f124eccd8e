//! Recursive ownership repair.
//!
//! Traversal (`walkdir`, depth-first, lazy) is kept separate from the
//! visitor that applies `chown(2)`.

use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use nix::unistd::{chown, Gid, Uid};
use walkdir::{DirEntry, WalkDir};

use crate::provision::{Owner, ProvisionError};

/// Directories under `root` that ownership repair visits, `root` first.
///
/// Hidden entries (leading `.`) are pruned along with their subtrees;
/// plain files are not yielded.
pub fn directories(root: &Path) -> impl Iterator<Item = Result<DirEntry, walkdir::Error>> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
        .filter(|entry| match entry {
            Ok(entry) => entry.file_type().is_dir(),
            Err(_) => true,
        })
}

/// Hand `root` and every visible directory below it to `owner`.
///
/// Returns the number of directories changed.
pub fn chown_tree(root: &Path, owner: Owner) -> Result<usize, ProvisionError> {
    let uid = Uid::from_raw(owner.uid);
    let gid = Gid::from_raw(owner.gid);
    let mut changed = 0;

    for entry in directories(root) {
        let entry = entry?;
        chown(entry.path(), Some(uid), Some(gid)).map_err(|source| ProvisionError::Chown {
            path: entry.path().to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %entry.path().display(), "Changed owner");
        changed += 1;
    }

    Ok(changed)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().as_bytes().starts_with(b".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_directories_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join(".hidden/inner")).unwrap();
        fs::write(root.join("a/file.txt"), b"x").unwrap();

        let mut visited: Vec<_> = directories(root)
            .map(|e| e.unwrap().path().strip_prefix(root).unwrap().to_path_buf())
            .collect();
        visited.sort();

        assert_eq!(
            visited,
            vec![
                Path::new("").to_path_buf(),
                Path::new("a").to_path_buf(),
                Path::new("a/b").to_path_buf(),
            ]
        );
    }

    #[test]
    fn hidden_check_ignores_encoding() {
        use std::ffi::OsStr;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let hidden = root.join(OsStr::from_bytes(b".\xffcache"));
        fs::create_dir_all(hidden.join("inner")).unwrap();
        fs::create_dir(root.join(OsStr::from_bytes(b"data\xff"))).unwrap();

        let visited: Vec<_> = directories(root).map(|e| e.unwrap().into_path()).collect();

        assert_eq!(visited.len(), 2, "got {visited:?}");
        assert!(visited.iter().all(|p| !p.starts_with(&hidden)));
    }

    #[test]
    fn chown_to_self_counts_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("x/y")).unwrap();

        let changed = chown_tree(dir.path(), Owner::effective()).unwrap();
        assert_eq!(changed, 3);
    }

    #[test]
    fn missing_root_is_a_walk_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = chown_tree(&dir.path().join("absent"), Owner::effective()).unwrap_err();
        assert!(matches!(err, ProvisionError::Walk(_)));
    }
}
