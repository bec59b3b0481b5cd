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

//! Sync engine
//!
//! Maps remote, immutable asset versions onto one mutable working folder per
//! asset and keeps three pieces of local state in step:
//!
//! - the folder itself, `<download_root>/<name>_<id8>/`
//! - the asset's entry in the [`VersionIndex`]
//! - the asset's [`FingerprintRecord`]
//!
//! Per asset the lifecycle is `NoLocalCopy -> Clean <-> Dirty`, where
//! `ensure_materialized` and `commit` lead back to `Clean` and `unsync` to
//! `NoLocalCopy`. Dirtiness is always derived by hashing, never stored.
//!
//! Operations on different assets are independent. Operations on the same
//! asset are not serialized here; callers must not overlap them.

use crate::archive::{self, LocalFile};
use crate::error::{SyncError, SyncResult};
use crate::fingerprint::{FingerprintRecord, FingerprintStore};
use crate::hash::hash_folder;
use crate::index::{DownloadedEntry, VersionIndex};
use crate::launch::{LaunchRequest, Launcher};
use crate::naming::folder_name_for;
use griddle_remote::{AssetInfo, RemoteRepository, VersionCreate};
use griddle_store::{keys, KeyValueStore, KeyValueStoreExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Engine settings
#[derive(Debug, Clone)]
pub struct SyncEngineConfig {
    /// Default download root; a root set through
    /// [`SyncEngine::set_download_root`] takes precedence
    pub download_root: PathBuf,
}

impl SyncEngineConfig {
    pub fn new(download_root: impl Into<PathBuf>) -> Self {
        Self {
            download_root: download_root.into(),
        }
    }
}

/// Derived per-asset state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum AssetStatus {
    NoLocalCopy,
    Clean { semver: Option<String> },
    Dirty { semver: Option<String> },
}

/// An asset's resolved working copy
struct LocalCopy {
    entry: DownloadedEntry,
    root: PathBuf,
    folder: PathBuf,
}

pub struct SyncEngine {
    store: Arc<dyn KeyValueStore>,
    remote: Arc<dyn RemoteRepository>,
    index: VersionIndex,
    download_root: RwLock<PathBuf>,
}

impl SyncEngine {
    /// Open the engine over a store and a remote
    ///
    /// Runs persisted-state migrations before anything else touches the index.
    pub async fn open(
        config: SyncEngineConfig,
        store: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteRepository>,
    ) -> SyncResult<Self> {
        let index = VersionIndex::open(Arc::clone(&store)).await?;

        let persisted: Option<String> = store.get_typed(keys::DOWNLOAD_FOLDER).await?;
        let download_root = persisted
            .map(PathBuf::from)
            .unwrap_or(config.download_root);
        info!(download_root = %download_root.display(), "Sync engine ready");

        Ok(Self {
            store,
            remote,
            index,
            download_root: RwLock::new(download_root),
        })
    }

    pub async fn download_root(&self) -> PathBuf {
        self.download_root.read().await.clone()
    }

    /// Change where new working copies go
    ///
    /// Existing folders are not moved; entries whose folder is not under the new
    /// root report `NotFound` until they are synced again.
    pub async fn set_download_root(&self, path: impl Into<PathBuf>) -> SyncResult<()> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(SyncError::invalid_input(format!(
                "download folder must be an absolute path: {}",
                path.display()
            )));
        }
        let text = path
            .to_str()
            .ok_or_else(|| {
                SyncError::invalid_input(format!("download folder is not UTF-8: {}", path.display()))
            })?
            .to_owned();

        self.store.set_typed(keys::DOWNLOAD_FOLDER, &text).await?;
        *self.download_root.write().await = path;
        info!(download_root = %text, "Download folder changed");
        Ok(())
    }

    /// Snapshot of the local version index
    pub async fn list_downloaded(&self) -> SyncResult<Vec<DownloadedEntry>> {
        self.index.all().await
    }

    /// Make the asset's folder hold `version` (or the latest version)
    ///
    /// With no remote versions the folder is reset to empty and indexed with no
    /// version; asking for a specific version in that case is `NotFound`.
    /// Unknown versions fail before anything is downloaded.
    #[instrument(skip(self), fields(asset_id = %asset_id))]
    pub async fn ensure_materialized(
        &self,
        asset_id: Uuid,
        version: Option<&str>,
    ) -> SyncResult<Vec<DownloadedEntry>> {
        let info = self.remote.asset_info(asset_id).await?;
        let asset_name = info.asset.asset_name.clone();
        let folder_name = folder_name_for(&asset_name, asset_id);
        let root = self.download_root().await;
        let destination = root.join(&folder_name);
        let previous = self.index.get(asset_id).await?;

        let semver = match info.latest() {
            None => {
                if let Some(requested) = version {
                    return Err(SyncError::not_found(format!(
                        "version {} of asset {}",
                        requested, asset_id
                    )));
                }
                debug!(folder = %folder_name, "Asset has no versions, creating empty folder");
                archive::reset_dir(destination.clone()).await?;
                None
            }
            Some(latest) => {
                let tag = match version {
                    None => latest.semver.clone(),
                    Some(requested) => self.resolve_version(&info, requested).await?,
                };
                let bytes = self.remote.download_version(asset_id, &tag).await?;
                debug!(semver = %tag, bytes = bytes.len(), "Downloaded version");
                archive::unpack(bytes, destination.clone()).await?;
                Some(tag)
            }
        };

        let entries = self
            .index
            .upsert(asset_id, semver.clone(), folder_name.clone())
            .await?;

        let hash = hash_folder(destination).await?;
        self.fingerprints(&root)
            .save(&FingerprintRecord::new(asset_id, asset_name, semver.clone(), hash))
            .await?;

        if let Some(previous) = previous.filter(|p| p.folder_name != folder_name) {
            info!(old = %previous.folder_name, new = %folder_name, "Asset renamed, removing old folder");
            archive::remove_dir(root.join(&previous.folder_name)).await?;
        }

        info!(semver = ?semver, folder = %folder_name, "Asset materialized");
        Ok(entries)
    }

    /// Working copy for an asset that has no versions yet
    pub async fn create_initial_version(&self, asset_id: Uuid) -> SyncResult<Vec<DownloadedEntry>> {
        self.ensure_materialized(asset_id, None).await
    }

    /// Whether the working copy differs from the version it was synced to
    #[instrument(skip(self), fields(asset_id = %asset_id))]
    pub async fn is_dirty(&self, asset_id: Uuid) -> SyncResult<bool> {
        let local = self.resolve_local(asset_id).await?;
        let hash = hash_folder(local.folder.clone()).await?;

        let dirty = match self.fingerprints(&local.root).load(asset_id).await? {
            None => true,
            Some(record) => record.folder_hash != hash || record.downloaded_version != local.entry.semver,
        };
        debug!(dirty, "Checked working copy");
        Ok(dirty)
    }

    pub async fn status(&self, asset_id: Uuid) -> SyncResult<AssetStatus> {
        let Some(entry) = self.index.get(asset_id).await? else {
            return Ok(AssetStatus::NoLocalCopy);
        };

        let semver = entry.semver;
        Ok(if self.is_dirty(asset_id).await? {
            AssetStatus::Dirty { semver }
        } else {
            AssetStatus::Clean { semver }
        })
    }

    /// Upload the working copy as a new version
    ///
    /// The folder is hashed before it is packed; that hash becomes the new
    /// fingerprint, so edits made while the upload runs still show as dirty.
    /// If the upload fails nothing local changes.
    #[instrument(skip(self, message), fields(asset_id = %asset_id))]
    pub async fn commit(
        &self,
        asset_id: Uuid,
        message: &str,
        is_major: bool,
    ) -> SyncResult<Vec<DownloadedEntry>> {
        let local = self.resolve_local(asset_id).await?;
        if message.trim().is_empty() {
            return Err(SyncError::invalid_input("commit message cannot be empty"));
        }

        let hash = hash_folder(local.folder.clone()).await?;
        let archive = archive::pack(local.folder.clone()).await?;
        debug!(bytes = archive.len(), "Packed working copy");

        let info = VersionCreate {
            message: message.to_string(),
            is_major,
        };
        let version = self.remote.upload_version(asset_id, archive, &info).await?;

        let entries = self
            .index
            .upsert(asset_id, Some(version.semver.clone()), local.entry.folder_name.clone())
            .await
            .inspect_err(|e| {
                error!(semver = %version.semver, error = %e, "Version uploaded but not recorded locally");
            })?;

        let fingerprints = self.fingerprints(&local.root);
        let asset_name = self.asset_name_hint(&fingerprints, &local.entry).await?;
        fingerprints
            .save(&FingerprintRecord::new(
                asset_id,
                asset_name,
                Some(version.semver.clone()),
                hash,
            ))
            .await
            .inspect_err(|e| {
                error!(semver = %version.semver, error = %e, "Version uploaded but fingerprint not written");
            })?;

        info!(semver = %version.semver, is_major, "Committed working copy");
        Ok(entries)
    }

    /// Delete the working copy and forget it
    ///
    /// Assets without a working copy are left alone. The folder is looked up
    /// under the current download root: a copy made before the root changed
    /// is not deleted, only forgotten.
    #[instrument(skip(self), fields(asset_id = %asset_id))]
    pub async fn unsync(&self, asset_id: Uuid) -> SyncResult<Vec<DownloadedEntry>> {
        let Some(entry) = self.index.get(asset_id).await? else {
            debug!("No working copy to remove");
            return self.index.all().await;
        };

        let root = self.download_root().await;
        let folder = root.join(&entry.folder_name);
        if !tokio::fs::try_exists(&folder).await.unwrap_or(false) {
            warn!(
                folder = %folder.display(),
                "Working copy not found under the current download root"
            );
        }
        archive::remove_dir(folder).await?;
        let entries = self.index.remove(asset_id).await?;
        self.fingerprints(&root).remove(asset_id).await?;

        info!(folder = %entry.folder_name, "Working copy removed");
        Ok(entries)
    }

    /// Path of an asset's working copy
    pub async fn local_folder(&self, asset_id: Uuid) -> SyncResult<PathBuf> {
        Ok(self.resolve_local(asset_id).await?.folder)
    }

    /// Files in an asset's working copy
    pub async fn list_local_files(&self, asset_id: Uuid) -> SyncResult<Vec<LocalFile>> {
        let folder = self.local_folder(asset_id).await?;
        archive::list_files(folder).await
    }

    /// What a launcher needs to open an asset's working copy
    pub async fn launch_request(&self, asset_id: Uuid) -> SyncResult<LaunchRequest> {
        let local = self.resolve_local(asset_id).await?;
        let asset_name = self
            .asset_name_hint(&self.fingerprints(&local.root), &local.entry)
            .await?;
        Ok(LaunchRequest {
            folder: local.folder,
            asset_name,
        })
    }

    /// Hand an asset's working copy to a launcher
    pub async fn launch(&self, asset_id: Uuid, launcher: &dyn Launcher) -> SyncResult<()> {
        let request = self.launch_request(asset_id).await?;
        launcher.launch(&request).await
    }

    async fn resolve_version(&self, info: &AssetInfo, requested: &str) -> SyncResult<String> {
        if info.find(requested).is_some() {
            return Ok(requested.to_string());
        }

        // asset_info only embeds the most recent versions
        self.remote
            .list_versions(info.asset.id)
            .await?
            .into_iter()
            .find(|v| v.semver == requested)
            .map(|v| v.semver)
            .ok_or_else(|| {
                SyncError::not_found(format!("version {} of asset {}", requested, info.asset.id))
            })
    }

    async fn resolve_local(&self, asset_id: Uuid) -> SyncResult<LocalCopy> {
        let entry = self
            .index
            .get(asset_id)
            .await?
            .ok_or_else(|| SyncError::not_found(format!("no local copy of asset {}", asset_id)))?;

        let root = self.download_root().await;
        let folder = root.join(&entry.folder_name);
        if !tokio::fs::metadata(&folder).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Err(SyncError::not_found(format!(
                "folder {} of asset {}",
                folder.display(),
                asset_id
            )));
        }

        Ok(LocalCopy {
            entry,
            root,
            folder,
        })
    }

    async fn asset_name_hint(
        &self,
        fingerprints: &FingerprintStore,
        entry: &DownloadedEntry,
    ) -> SyncResult<String> {
        if let Some(record) = fingerprints.load(entry.asset_id).await? {
            return Ok(record.asset_name);
        }
        Ok(entry
            .folder_name
            .rsplit_once('_')
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| entry.folder_name.clone()))
    }

    fn fingerprints(&self, root: &Path) -> FingerprintStore {
        FingerprintStore::new(root)
    }
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("store", &self.store)
            .field("remote", &self.remote)
            .finish()
    }
}
