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

//! Archive codec for asset versions
//!
//! Versions travel as ZIP archives, the format the asset server stores and
//! every other client reads. Packing is deterministic: entries sorted by path,
//! the DOS epoch as every timestamp, fixed unix modes (0644 files, 0755
//! directories) and directories included so empty folders survive a round
//! trip. Packing the same tree twice yields identical bytes.
//!
//! Unpacking never leaves a half-written destination: the archive is
//! extracted into a staging directory next to the destination, which is then
//! swapped into place.

use crate::error::{IoResultExt, SyncError, SyncResult};
use crate::walk::{self, EntryKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// File type bits of a unix mode, and the value marking a symbolic link
const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// A file inside a materialized folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFile {
    /// `/`-separated path relative to the asset folder
    pub path: String,
    pub size: u64,
}

/// Pack a folder on the blocking thread pool
pub async fn pack(source: impl Into<PathBuf>) -> SyncResult<Vec<u8>> {
    let source = source.into();
    blocking(move || pack_blocking(&source)).await
}

/// Replace `destination` with the contents of an archive
pub async fn unpack(bytes: impl AsRef<[u8]> + Send + 'static, destination: impl Into<PathBuf>) -> SyncResult<()> {
    let destination = destination.into();
    blocking(move || unpack_blocking(bytes.as_ref(), &destination)).await
}

/// Replace `destination` with an empty directory
pub async fn reset_dir(destination: impl Into<PathBuf>) -> SyncResult<()> {
    let destination = destination.into();
    blocking(move || replace_dir(&destination, |_| Ok(()))).await
}

/// Delete a folder tree; a missing folder is not an error
pub async fn remove_dir(path: impl Into<PathBuf>) -> SyncResult<()> {
    let path = path.into();
    blocking(move || match fs::remove_dir_all(&path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other.at_path("removing", &path),
    })
    .await
}

/// Relative listing of the files in a folder
pub async fn list_files(folder: impl Into<PathBuf>) -> SyncResult<Vec<LocalFile>> {
    let folder = folder.into();
    blocking(move || {
        Ok(walk::scan(&folder)?
            .into_iter()
            .filter_map(|entry| match entry.kind {
                EntryKind::File { len } => Some(LocalFile {
                    path: entry.rel,
                    size: len,
                }),
                EntryKind::Dir => None,
            })
            .collect())
    })
    .await
}

async fn blocking<T, F>(f: F) -> SyncResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> SyncResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SyncError::io("running archive task", io::Error::other(e)))?
}

/// Build a deterministic `.zip` of `source`
pub fn pack_blocking(source: &Path) -> SyncResult<Vec<u8>> {
    let entries = walk::scan(source)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in &entries {
        let context = || format!("packing {}", entry.path.display());
        match entry.kind {
            EntryKind::Dir => {
                writer
                    .add_directory(format!("{}/", entry.rel), entry_options(0o755))
                    .map_err(|e| SyncError::io(context(), io::Error::other(e)))?;
            }
            EntryKind::File { len } => {
                let options = entry_options(0o644).large_file(len > u64::from(u32::MAX));
                writer
                    .start_file(entry.rel.as_str(), options)
                    .map_err(|e| SyncError::io(context(), io::Error::other(e)))?;

                let file = fs::File::open(&entry.path).at_path("opening", &entry.path)?;
                // a file that changes size mid-pack must fail, not truncate
                let mut reader = file.take(len);
                io::copy(&mut reader, &mut writer).map_err(|e| SyncError::io(context(), e))?;
                if reader.limit() != 0 {
                    return Err(SyncError::io(
                        context(),
                        io::Error::new(io::ErrorKind::UnexpectedEof, "file shrank while packing"),
                    ));
                }
            }
        }
    }

    let bytes = writer
        .finish()
        .map_err(|e| SyncError::io("finishing zip archive", io::Error::other(e)))?
        .into_inner();

    debug!(source = %source.display(), entries = entries.len(), bytes = bytes.len(), "Packed folder");
    Ok(bytes)
}

/// Fixed per-entry metadata so identical trees pack to identical bytes
fn entry_options(mode: u32) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(mode)
}

/// Extract `bytes` and swap the result into `destination`
pub fn unpack_blocking(bytes: &[u8], destination: &Path) -> SyncResult<()> {
    replace_dir(destination, |staging| extract(bytes, staging))?;
    debug!(destination = %destination.display(), bytes = bytes.len(), "Unpacked archive");
    Ok(())
}

/// Populate a fresh staging directory, then swap it in for `destination`
///
/// `destination` is either fully replaced or left exactly as it was.
fn replace_dir<F>(destination: &Path, populate: F) -> SyncResult<()>
where
    F: FnOnce(&Path) -> SyncResult<()>,
{
    let parent = destination.parent().ok_or_else(|| {
        SyncError::invalid_input(format!("{} has no parent directory", destination.display()))
    })?;
    fs::create_dir_all(parent).at_path("creating", parent)?;

    let staging = tempfile::Builder::new()
        .prefix(".griddle-staging-")
        .tempdir_in(parent)
        .at_path("creating staging directory in", parent)?;
    populate(staging.path())?;

    // Move the old tree aside so the swap is two renames
    let retired = tempfile::Builder::new()
        .prefix(".griddle-retired-")
        .tempdir_in(parent)
        .at_path("creating staging directory in", parent)?;
    let aside = retired.path().join("previous");
    let had_previous = match fs::rename(destination, &aside) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => return Err(SyncError::io(format!("moving aside {}", destination.display()), e)),
    };

    if let Err(e) = fs::rename(staging.path(), destination) {
        if had_previous {
            if let Err(restore) = fs::rename(&aside, destination) {
                warn!(
                    destination = %destination.display(),
                    error = %restore,
                    "Failed to restore previous folder after swap failure"
                );
            }
        }
        return Err(SyncError::io(format!("moving staged tree to {}", destination.display()), e));
    }

    // `staging` now points at a path that no longer exists; dropping it is a no-op.
    // Dropping `retired` deletes the previous tree.
    drop(staging);
    retired
        .close()
        .at_path("removing previous version of", destination)?;
    Ok(())
}

fn extract(bytes: &[u8], target: &Path) -> SyncResult<()> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SyncError::format(format!("unreadable archive: {}", e)))?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut count = 0usize;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| SyncError::format(format!("corrupt archive entry: {}", e)))?;
        let name = entry.name().to_owned();
        let rel = safe_relative_path(Path::new(&name))?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        if entry.unix_mode().is_some_and(|mode| mode & S_IFMT == S_IFLNK) {
            warn!(path = %name, "Skipping symbolic link in archive");
            continue;
        }
        let out = target.join(&rel);

        if entry.is_dir() {
            fs::create_dir_all(&out).at_path("creating", &out)?;
        } else {
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent).at_path("creating", parent)?;
            }
            let mut file = fs::File::create(&out).at_path("creating", &out)?;
            // reading to the end verifies the entry's CRC
            loop {
                let n = entry
                    .read(&mut buffer)
                    .map_err(|e| SyncError::format(format!("corrupt data for {}: {}", name, e)))?;
                if n == 0 {
                    break;
                }
                file.write_all(&buffer[..n]).at_path("writing", &out)?;
            }
            file.flush().at_path("writing", &out)?;
        }
        count += 1;
    }

    debug!(target = %target.display(), entries = count, "Extracted archive");
    Ok(())
}

/// Reject absolute paths and `..` components
fn safe_relative_path(path: &Path) -> SyncResult<PathBuf> {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(SyncError::format(format!(
                    "entry escapes destination: {}",
                    path.display()
                )))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(SyncError::format(format!(
                    "absolute entry path: {}",
                    path.display()
                )))
            }
        }
    }
    Ok(clean)
}
