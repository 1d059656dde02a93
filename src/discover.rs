//! Shared object discovery.
//!
//! Walks a directory tree top-down. Each directory's entries are visited in
//! file name order, and its matching files come before anything found in
//! its subdirectories. Symlinked directories are not entered, so cycles
//! cannot occur.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Whether a file name follows the shared object naming convention
/// (`libfoo.so`, `libc.so.6`, `libfoo.so.1.2.3`).
pub fn is_shared_object_name(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.ends_with(".so") || name.contains(".so.")
}

/// Recursively collects every shared object under `root`.
pub fn find_shared_objects(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.exists() {
        return Err(Error::not_found(root));
    }
    let mut found = Vec::new();
    walk(root, &mut found);
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!("Skipping unreadable directory {}: {}", dir.display(), err);
            return;
        }
    };
    let mut entries: Vec<_> = entries
        .filter_map(|entry| {
            entry
                .map_err(|err| tracing::debug!("Skipping entry in {}: {}", dir.display(), err))
                .ok()
        })
        .collect();
    entries.sort_by_key(|entry| entry.file_name());

    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            subdirs.push(path);
            continue;
        }
        if file_type.is_symlink() && path.is_dir() {
            tracing::trace!("Not following symlinked directory {}", path.display());
            continue;
        }
        if is_shared_object_name(&entry.file_name()) {
            found.push(path);
        }
    }

    for subdir in subdirs {
        walk(&subdir, found);
    }
}
