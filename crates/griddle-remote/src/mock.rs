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

//! In-memory remote repository for testing
//!
//! Behaves like the real server where the sync engine can observe it:
//! tags are assigned with [`next_semver`], version listings are most recent
//! first, `asset_info` returns at most [`ASSET_INFO_VERSION_LIMIT`] versions and
//! listings come in pages of [`LISTING_PAGE_SIZE`].
//! Uploads and downloads can be made to fail on demand.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{RemoteError, RemoteResult};
use crate::types::{next_semver, Asset, AssetCreate, AssetInfo, Version, VersionCreate};
use crate::{RemoteRepository, LISTING_PAGE_SIZE};

/// Number of versions the server embeds in `GET /assets/{uuid}`
pub const ASSET_INFO_VERSION_LIMIT: usize = 3;

const MOCK_AUTHOR: &str = "mock";

#[derive(Debug, Clone)]
struct StoredAsset {
    asset: Asset,
    /// Most recent first
    versions: Vec<(Version, Bytes)>,
}

/// Mock remote backed by a shared in-memory map. Clones share state.
#[derive(Clone, Default)]
pub struct MockRemote {
    assets: Arc<RwLock<HashMap<Uuid, StoredAsset>>>,
    fail_uploads: Arc<AtomicBool>,
    fail_downloads: Arc<AtomicBool>,
    uploads: Arc<AtomicUsize>,
    downloads: Arc<AtomicUsize>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset with no versions
    pub async fn add_asset(&self, asset_name: &str) -> Asset {
        let asset = Asset {
            id: Uuid::new_v4(),
            asset_name: asset_name.to_string(),
            author_pennkey: MOCK_AUTHOR.to_string(),
            keywords: String::new(),
            image_uri: None,
        };
        self.assets.write().await.insert(
            asset.id,
            StoredAsset {
                asset: asset.clone(),
                versions: Vec::new(),
            },
        );
        asset
    }

    /// Seed a version with an explicit tag; it becomes the latest
    pub async fn add_version(
        &self,
        asset_id: Uuid,
        semver: &str,
        message: &str,
        archive: impl Into<Bytes>,
    ) -> RemoteResult<Version> {
        let mut assets = self.assets.write().await;
        let stored = assets
            .get_mut(&asset_id)
            .ok_or_else(|| RemoteError::not_found(format!("asset {}", asset_id)))?;

        let version = Version {
            asset_id,
            semver: semver.to_string(),
            message: message.to_string(),
            author_pennkey: MOCK_AUTHOR.to_string(),
            date: Utc::now(),
            is_major: None,
        };
        stored.versions.insert(0, (version.clone(), archive.into()));
        Ok(version)
    }

    /// Rename an asset, as another client editing metadata would
    pub async fn rename_asset(&self, asset_id: Uuid, asset_name: &str) -> RemoteResult<()> {
        let mut assets = self.assets.write().await;
        let stored = assets
            .get_mut(&asset_id)
            .ok_or_else(|| RemoteError::not_found(format!("asset {}", asset_id)))?;
        stored.asset.asset_name = asset_name.to_string();
        Ok(())
    }

    /// Archive bytes stored for a version
    pub async fn archive(&self, asset_id: Uuid, semver: &str) -> Option<Bytes> {
        let assets = self.assets.read().await;
        assets.get(&asset_id).and_then(|stored| {
            stored
                .versions
                .iter()
                .find(|(v, _)| v.semver == semver)
                .map(|(_, bytes)| bytes.clone())
        })
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_downloads(&self, fail: bool) {
        self.fail_downloads.store(fail, Ordering::SeqCst);
    }

    /// Successful uploads so far
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Successful downloads so far
    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for MockRemote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRemote")
            .field("uploads", &self.upload_count())
            .field("downloads", &self.download_count())
            .finish()
    }
}

#[async_trait]
impl RemoteRepository for MockRemote {
    async fn asset_info(&self, asset_id: Uuid) -> RemoteResult<AssetInfo> {
        let assets = self.assets.read().await;
        let stored = assets
            .get(&asset_id)
            .ok_or_else(|| RemoteError::not_found("Asset not found"))?;

        Ok(AssetInfo {
            asset: stored.asset.clone(),
            versions: stored
                .versions
                .iter()
                .take(ASSET_INFO_VERSION_LIMIT)
                .map(|(v, _)| v.clone())
                .collect(),
        })
    }

    async fn versions_page(&self, asset_id: Uuid, offset: usize) -> RemoteResult<Vec<Version>> {
        let assets = self.assets.read().await;
        let stored = assets
            .get(&asset_id)
            .ok_or_else(|| RemoteError::not_found("Asset not found"))?;
        Ok(stored
            .versions
            .iter()
            .skip(offset)
            .take(LISTING_PAGE_SIZE)
            .map(|(v, _)| v.clone())
            .collect())
    }

    async fn assets_page(&self, search: Option<&str>, offset: usize) -> RemoteResult<Vec<Asset>> {
        let needle = search.map(str::to_lowercase);
        let assets = self.assets.read().await;

        let mut matching: Vec<&Asset> = assets
            .values()
            .map(|stored| &stored.asset)
            .filter(|asset| match &needle {
                Some(needle) => asset.asset_name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| a.asset_name.cmp(&b.asset_name).then(a.id.cmp(&b.id)));

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(LISTING_PAGE_SIZE)
            .cloned()
            .collect())
    }

    async fn download_version(&self, asset_id: Uuid, semver: &str) -> RemoteResult<Bytes> {
        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(RemoteError::rejected(503, "download failure injected"));
        }

        let bytes = self
            .archive(asset_id, semver)
            .await
            .ok_or_else(|| RemoteError::not_found("File not found"))?;
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(bytes)
    }

    async fn upload_version(
        &self,
        asset_id: Uuid,
        archive: Vec<u8>,
        info: &VersionCreate,
    ) -> RemoteResult<Version> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(RemoteError::rejected(503, "upload failure injected"));
        }

        let mut assets = self.assets.write().await;
        let stored = assets
            .get_mut(&asset_id)
            .ok_or_else(|| RemoteError::not_found("Asset not found"))?;

        let semver = next_semver(
            stored.versions.iter().map(|(v, _)| v.semver.as_str()),
            info.is_major,
        );
        let version = Version {
            asset_id,
            semver,
            message: info.message.clone(),
            author_pennkey: MOCK_AUTHOR.to_string(),
            date: Utc::now(),
            is_major: Some(info.is_major),
        };
        stored
            .versions
            .insert(0, (version.clone(), Bytes::from(archive)));
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(version)
    }

    async fn create_asset(&self, asset: &AssetCreate) -> RemoteResult<Asset> {
        let created = Asset {
            id: Uuid::new_v4(),
            asset_name: asset.asset_name.clone(),
            author_pennkey: MOCK_AUTHOR.to_string(),
            keywords: asset.keywords.clone(),
            image_uri: asset.image_uri.clone(),
        };
        self.assets.write().await.insert(
            created.id,
            StoredAsset {
                asset: created.clone(),
                versions: Vec::new(),
            },
        );
        Ok(created)
    }

    async fn update_asset(&self, asset_id: Uuid, asset: &AssetCreate) -> RemoteResult<Asset> {
        let mut assets = self.assets.write().await;
        let stored = assets
            .get_mut(&asset_id)
            .ok_or_else(|| RemoteError::not_found("Asset not found"))?;
        stored.asset.asset_name = asset.asset_name.clone();
        stored.asset.keywords = asset.keywords.clone();
        stored.asset.image_uri = asset.image_uri.clone();
        Ok(stored.asset.clone())
    }
}
