//! Data path provisioning against real directory trees.

use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use cims_server::provision::{ensure_data_path, make_path, Owner};

mod common;

fn snapshot(path: &Path) -> (u32, u32, u32) {
    let meta = fs::metadata(path).unwrap();
    (meta.uid(), meta.gid(), meta.permissions().mode())
}

#[test]
fn provisioning_twice_is_idempotent() {
    let (_dir, paths) = common::fresh_paths();
    let owner = Owner::effective();

    ensure_data_path(&paths, owner).unwrap();
    let root_before = snapshot(paths.root());
    let data_before = snapshot(paths.data());

    ensure_data_path(&paths, owner).unwrap();
    assert_eq!(snapshot(paths.root()), root_before);
    assert_eq!(snapshot(paths.data()), data_before);
    assert_eq!(Owner::of_path(paths.data()).unwrap(), owner);
}

#[test]
fn make_path_leaves_existing_contents_alone() {
    let (_dir, paths) = common::provisioned_paths();
    let marker = paths.data().join("keep.me");
    fs::write(&marker, b"data").unwrap();

    make_path(paths.data()).unwrap();
    assert_eq!(fs::read(&marker).unwrap(), b"data");
}

#[test]
fn ownership_propagates_to_every_directory() {
    if !nix::unistd::geteuid().is_root() {
        return;
    }

    let (_dir, paths) = common::provisioned_paths();
    let a = paths.data().join("a");
    let b = a.join("b");
    fs::create_dir_all(&b).unwrap();
    fs::write(a.join("file.txt"), b"x").unwrap();
    fs::create_dir_all(paths.data().join(".cache")).unwrap();

    let owner = Owner::new(1000, 1000);
    ensure_data_path(&paths, owner).unwrap();

    for dir in [paths.root(), paths.data(), a.as_path(), b.as_path()] {
        assert_eq!(Owner::of_path(dir).unwrap(), owner, "{}", dir.display());
    }
    // Plain files and hidden directories keep their owner.
    assert_eq!(Owner::of_path(&a.join("file.txt")).unwrap().uid, 0);
    assert_eq!(Owner::of_path(&paths.data().join(".cache")).unwrap().uid, 0);
}
