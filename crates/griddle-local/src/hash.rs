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

//! Content hashing of working-copy folders
//!
//! A folder hash is SHA-256 over a canonical stream built from the sorted
//! listing produced by the walker:
//!
//! ```text
//! d <path>\0                      for each directory
//! f <path>\0 <len>\0 <bytes>      for each regular file
//! ```
//!
//! Names and bytes are all that count. Timestamps, permissions and other
//! metadata never change the hash; any addition, removal, rename or edit does.

use crate::error::{IoResultExt, SyncError, SyncResult};
use crate::walk::{self, EntryKind};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Read buffer size for file contents
const CHUNK_SIZE: usize = 64 * 1024;

/// Hex-encoded SHA-256 digest of a folder's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash a folder on the blocking thread pool
pub async fn hash_folder(path: impl Into<PathBuf>) -> SyncResult<ContentHash> {
    let path = path.into();
    tokio::task::spawn_blocking(move || hash_folder_blocking(&path))
        .await
        .map_err(|e| SyncError::io("hashing folder", std::io::Error::other(e)))?
}

/// Hash a folder on the current thread
pub fn hash_folder_blocking(path: &Path) -> SyncResult<ContentHash> {
    let entries = walk::scan(path)?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    for entry in &entries {
        match entry.kind {
            EntryKind::Dir => {
                hasher.update(b"d ");
                hasher.update(entry.rel.as_bytes());
                hasher.update(b"\0");
            }
            EntryKind::File { len } => {
                hasher.update(b"f ");
                hasher.update(entry.rel.as_bytes());
                hasher.update(b"\0 ");
                hasher.update(len.to_string().as_bytes());
                hasher.update(b"\0 ");

                let mut file = std::fs::File::open(&entry.path).at_path("opening", &entry.path)?;
                loop {
                    let n = file.read(&mut buffer).at_path("reading", &entry.path)?;
                    if n == 0 {
                        break;
                    }
                    hasher.update(&buffer[..n]);
                }
            }
        }
    }

    let digest = hex::encode(hasher.finalize());
    tracing::trace!(path = %path.display(), entries = entries.len(), hash = %digest, "Hashed folder");
    Ok(ContentHash(digest))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[(&str, &[u8])]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_identical_content_identical_hash() {
        let a = tree(&[("scene.usda", b"#usda 1.0"), ("tex/wood.png", b"\x89PNG")]);
        let b = tree(&[("tex/wood.png", b"\x89PNG"), ("scene.usda", b"#usda 1.0")]);
        assert_eq!(
            hash_folder_blocking(a.path()).unwrap(),
            hash_folder_blocking(b.path()).unwrap()
        );
    }

    #[test]
    fn test_sensitive_to_edits_and_renames() {
        let base = tree(&[("a.txt", b"hello")]);
        let original = hash_folder_blocking(base.path()).unwrap();

        fs::write(base.path().join("a.txt"), b"hellp").unwrap();
        let edited = hash_folder_blocking(base.path()).unwrap();
        assert_ne!(original, edited);

        fs::rename(base.path().join("a.txt"), base.path().join("b.txt")).unwrap();
        let renamed = hash_folder_blocking(base.path()).unwrap();
        assert_ne!(edited, renamed);

        fs::create_dir(base.path().join("empty")).unwrap();
        assert_ne!(renamed, hash_folder_blocking(base.path()).unwrap());
    }

    #[test]
    fn test_boundaries_are_unambiguous() {
        // same concatenated bytes, different split between name and content
        let a = tree(&[("ab", b"c")]);
        let b = tree(&[("a", b"bc")]);
        assert_ne!(
            hash_folder_blocking(a.path()).unwrap(),
            hash_folder_blocking(b.path()).unwrap()
        );
    }

    #[test]
    fn test_ignores_mtime() {
        let dir = tree(&[("a.txt", b"x")]);
        let before = hash_folder_blocking(dir.path()).unwrap();
        let file = fs::File::options().write(true).open(dir.path().join("a.txt")).unwrap();
        file.set_modified(std::time::SystemTime::UNIX_EPOCH).unwrap();
        assert_eq!(before, hash_folder_blocking(dir.path()).unwrap());
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let dir = TempDir::new().unwrap();
        let hash = hash_folder_blocking(dir.path()).unwrap();
        // empty stream
        assert_eq!(
            hash.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn test_missing_folder() {
        let dir = TempDir::new().unwrap();
        let err = hash_folder(dir.path().join("missing")).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
