//! Assertion helpers for install and uninstall

#![allow(dead_code)]

use std::path::Path;

use batis_core::types::{InstalledFile, InstalledFileKind};

/// Assert that the manifest records `path` with the given kind
pub fn assert_recorded(manifest: &[InstalledFile], path: &Path, kind: InstalledFileKind) {
    assert!(
        manifest.iter().any(|f| f.path == path && f.kind == kind),
        "Expected {:?} ({:?}) in manifest: {:?}",
        path,
        kind,
        manifest
    );
}

/// Assert that nothing exists at `path`, dangling symlinks included
pub fn assert_absent(path: &Path) {
    assert!(
        path.symlink_metadata().is_err(),
        "Expected {} to be removed",
        path.display()
    );
}

/// Assert that a directory tree contains no regular files or symlinks
pub fn assert_no_files_under(dir: &Path) {
    if !dir.exists() {
        return;
    }
    let leftovers: Vec<_> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
        .map(|e| e.path().to_path_buf())
        .collect();
    assert!(leftovers.is_empty(), "Leftover files: {:?}", leftovers);
}
