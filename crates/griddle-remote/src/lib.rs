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

//! Griddle remote version repository
//!
//! Assets live on a central server as a list of immutable, server-numbered
//! versions. This crate provides the wire types, the [`RemoteRepository`]
//! capability the sync engine depends on, an HTTP client for the real API and
//! an in-memory [`MockRemote`] for tests.

pub mod client;
pub mod error;
pub mod mock;
pub mod types;

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use uuid::Uuid;

pub use client::{HttpRemote, RemoteConfig};
pub use error::{RemoteError, RemoteResult};
pub use mock::MockRemote;
pub use types::{
    next_semver, Asset, AssetCreate, AssetInfo, AuthState, Token, User, Version, VersionCreate,
};

/// Number of items the server returns per listing page
pub const LISTING_PAGE_SIZE: usize = 24;

/// Remote asset/version operations the sync engine needs
#[async_trait]
pub trait RemoteRepository: Send + Sync + Debug {
    /// Asset metadata plus its most recent versions, latest first
    async fn asset_info(&self, asset_id: Uuid) -> RemoteResult<AssetInfo>;

    /// One page of an asset's versions, latest first, starting at `offset`
    async fn versions_page(&self, asset_id: Uuid, offset: usize) -> RemoteResult<Vec<Version>>;

    /// Every version of an asset, latest first
    async fn list_versions(&self, asset_id: Uuid) -> RemoteResult<Vec<Version>> {
        let mut versions = Vec::new();
        loop {
            let page = self.versions_page(asset_id, versions.len()).await?;
            let last = page.len() < LISTING_PAGE_SIZE;
            versions.extend(page);
            if last {
                return Ok(versions);
            }
        }
    }

    /// One page of assets whose name contains `search` (case-insensitive)
    async fn assets_page(&self, search: Option<&str>, offset: usize) -> RemoteResult<Vec<Asset>>;

    /// Every asset matching `search`
    async fn list_assets(&self, search: Option<&str>) -> RemoteResult<Vec<Asset>> {
        let mut assets = Vec::new();
        loop {
            let page = self.assets_page(search, assets.len()).await?;
            let last = page.len() < LISTING_PAGE_SIZE;
            assets.extend(page);
            if last {
                return Ok(assets);
            }
        }
    }

    /// Archive bytes of one version
    async fn download_version(&self, asset_id: Uuid, semver: &str) -> RemoteResult<Bytes>;

    /// Upload a new version; the server assigns its tag
    async fn upload_version(
        &self,
        asset_id: Uuid,
        archive: Vec<u8>,
        info: &VersionCreate,
    ) -> RemoteResult<Version>;

    async fn create_asset(&self, asset: &AssetCreate) -> RemoteResult<Asset>;

    async fn update_asset(&self, asset_id: Uuid, asset: &AssetCreate) -> RemoteResult<Asset>;
}
