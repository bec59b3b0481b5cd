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

//! Fingerprint records
//!
//! A fingerprint remembers the content hash of an asset folder at the moment
//! it last matched a remote version (after a sync or a commit). Comparing it
//! with a fresh hash tells whether the working copy has local changes.
//!
//! Records live inside the download root, one JSON file per asset:
//!
//! ```text
//! <download_root>/.griddle/fingerprints/<asset_id>.json
//! ```

use crate::error::{IoResultExt, SyncError, SyncResult};
use crate::hash::ContentHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

/// Hidden bookkeeping directory inside the download root
pub const METADATA_DIR: &str = ".griddle";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintRecord {
    pub asset_id: Uuid,
    pub asset_name: String,
    pub downloaded_version: Option<String>,
    pub folder_hash: ContentHash,
    pub recorded_at: DateTime<Utc>,
}

impl FingerprintRecord {
    pub fn new(
        asset_id: Uuid,
        asset_name: impl Into<String>,
        downloaded_version: Option<String>,
        folder_hash: ContentHash,
    ) -> Self {
        Self {
            asset_id,
            asset_name: asset_name.into(),
            downloaded_version,
            folder_hash,
            recorded_at: Utc::now(),
        }
    }
}

/// Fingerprint files under one download root
#[derive(Debug, Clone)]
pub struct FingerprintStore {
    dir: PathBuf,
}

impl FingerprintStore {
    pub fn new(download_root: &Path) -> Self {
        Self {
            dir: download_root.join(METADATA_DIR).join("fingerprints"),
        }
    }

    pub fn path_for(&self, asset_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", asset_id.hyphenated()))
    }

    /// Load the record for an asset
    ///
    /// A malformed record is reported as absent, which callers
    /// treat as "dirty".
    pub async fn load(&self, asset_id: Uuid) -> SyncResult<Option<FingerprintRecord>> {
        let path = self.path_for(asset_id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SyncError::io(format!("reading {}", path.display()), e)),
        };

        match serde_json::from_slice::<FingerprintRecord>(&bytes) {
            Ok(record) if record.asset_id == asset_id => Ok(Some(record)),
            Ok(record) => {
                warn!(%asset_id, found = %record.asset_id, "Fingerprint belongs to another asset");
                Ok(None)
            }
            Err(e) => {
                warn!(%asset_id, error = %e, "Ignoring malformed fingerprint");
                Ok(None)
            }
        }
    }

    /// Write a record atomically (temp file + rename)
    pub async fn save(&self, record: &FingerprintRecord) -> SyncResult<()> {
        fs::create_dir_all(&self.dir).await.at_path("creating", &self.dir)?;

        let path = self.path_for(record.asset_id);
        let temp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| SyncError::io("encoding fingerprint", io::Error::other(e)))?;

        let mut file = fs::File::create(&temp_path).await.at_path("creating", &temp_path)?;
        file.write_all(&bytes).await.at_path("writing", &temp_path)?;
        file.sync_all().await.at_path("writing", &temp_path)?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(SyncError::io(format!("renaming {}", temp_path.display()), e));
        }
        Ok(())
    }

    /// Delete the record for an asset; absent records are fine
    pub async fn remove(&self, asset_id: Uuid) -> SyncResult<()> {
        let path = self.path_for(asset_id);
        match fs::remove_file(&path).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other.at_path("removing", &path),
        }
    }
}
