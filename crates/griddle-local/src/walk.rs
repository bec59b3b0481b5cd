// Griddle - Asset sync for DCC pipelines
// Copyright (C) 2025 Griddle Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Canonical listing of a working-copy folder
//!
//! Hashing, packing and file listing all see a folder the same way: regular
//! files and directories only, symbolic links skipped without being followed,
//! entries keyed by their `/`-separated relative path and sorted bytewise.
//!
//! Names that are not valid UTF-8 cannot be stored in a version archive, so
//! such entries (and everything below such a directory) are skipped with a
//! warning rather than failing the whole scan.

use crate::error::{IoResultExt, SyncError, SyncResult};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    Dir,
    File { len: u64 },
}

#[derive(Debug, Clone)]
pub(crate) struct TreeEntry {
    /// `/`-separated path relative to the scanned root
    pub rel: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Fail with `NotFound` unless `root` is an existing directory
pub(crate) fn require_dir(root: &Path) -> SyncResult<()> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(SyncError::invalid_input(format!(
            "{} is not a directory",
            root.display()
        ))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SyncError::not_found(format!(
            "folder {}",
            root.display()
        ))),
        Err(e) => Err(SyncError::io(format!("reading {}", root.display()), e)),
    }
}

/// Scan `root` recursively; the root itself is not included
pub(crate) fn scan(root: &Path) -> SyncResult<Vec<TreeEntry>> {
    require_dir(root)?;

    let mut entries = Vec::new();
    let mut walker = WalkDir::new(root).min_depth(1).follow_links(false).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            SyncError::io(format!("walking {}", path.display()), io::Error::from(e))
        })?;

        let file_type = entry.file_type();
        let Some(rel) = relative_path(root, entry.path()) else {
            tracing::warn!(path = %entry.path().display(), "Skipping entry with non UTF-8 name");
            if file_type.is_dir() {
                walker.skip_current_dir();
            }
            continue;
        };

        let kind = if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            let len = entry.metadata().map_err(io::Error::from).at_path("reading", entry.path())?.len();
            EntryKind::File { len }
        } else {
            tracing::trace!(path = %entry.path().display(), "Skipping non-regular entry");
            continue;
        };

        entries.push(TreeEntry {
            rel,
            path: entry.into_path(),
            kind,
        });
    }

    entries.sort_by(|a, b| a.rel.as_bytes().cmp(b.rel.as_bytes()));
    Ok(entries)
}

/// `/`-joined path of `path` below `root`; `None` if a component is not UTF-8
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts = rel
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_sorted_and_relative() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("b/c")).unwrap();
        fs::write(dir.path().join("b/c/z.txt"), b"zz").unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        let entries = scan(dir.path()).unwrap();
        let rels: Vec<_> = entries.iter().map(|e| e.rel.as_str()).collect();
        assert_eq!(rels, vec!["a.txt", "b", "b/c", "b/c/z.txt", "empty"]);
        assert_eq!(entries[3].kind, EntryKind::File { len: 2 });
        assert_eq!(entries[4].kind, EntryKind::Dir);
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = scan(&dir.path().join("nope")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real.txt"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

        let rels: Vec<_> = scan(dir.path()).unwrap().into_iter().map(|e| e.rel).collect();
        assert_eq!(rels, vec!["real.txt"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("scene.usda"), b"#usda 1.0").unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b"tex\xff.png")), b"png").unwrap();
        let bad_dir = dir.path().join(OsStr::from_bytes(b"cache\xfe"));
        fs::create_dir(&bad_dir).unwrap();
        fs::write(bad_dir.join("frame.exr"), b"exr").unwrap();

        let rels: Vec<_> = scan(dir.path()).unwrap().into_iter().map(|e| e.rel).collect();
        assert_eq!(rels, vec!["scene.usda"]);
    }
}
