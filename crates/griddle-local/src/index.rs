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

//! Local version index
//!
//! Records which version of each asset is materialized locally and in which
//! folder. The list lives in the client store under `downloadedAssetVersions`
//! in the shape the desktop UI reads:
//!
//! ```json
//! [{ "asset_id": "0b6f9a62-...", "semver": "1.1", "folderName": "Chair_0b6f9a62" }]
//! ```
//!
//! There is at most one entry per asset. Mutations are read-modify-write
//! cycles over the whole list serialized by an index-wide lock, so concurrent
//! operations on different assets never drop each other's entries.

use crate::error::SyncResult;
use griddle_store::{keys, KeyValueStore, KeyValueStoreExt, MigrationManager};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// One materialized asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedEntry {
    pub asset_id: Uuid,
    /// `None` for a working copy created before any version existed
    pub semver: Option<String>,
    #[serde(rename = "folderName")]
    pub folder_name: String,
}

pub struct VersionIndex {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl VersionIndex {
    /// Open the index, migrating persisted state to the current schema first
    pub async fn open(store: Arc<dyn KeyValueStore>) -> SyncResult<Self> {
        let from = MigrationManager::with_builtin().run(store.as_ref()).await?;
        debug!(schema_version = from, "Opened version index");

        Ok(Self {
            store,
            write_lock: Mutex::new(()),
        })
    }

    /// Current snapshot of all entries
    pub async fn all(&self) -> SyncResult<Vec<DownloadedEntry>> {
        Ok(self
            .store
            .get_typed::<Vec<DownloadedEntry>>(keys::DOWNLOADED_ASSET_VERSIONS)
            .await?
            .unwrap_or_default())
    }

    pub async fn get(&self, asset_id: Uuid) -> SyncResult<Option<DownloadedEntry>> {
        Ok(self.all().await?.into_iter().find(|e| e.asset_id == asset_id))
    }

    /// Replace the entry for `asset_id`, keeping its position in the list
    pub async fn upsert(
        &self,
        asset_id: Uuid,
        semver: Option<String>,
        folder_name: String,
    ) -> SyncResult<Vec<DownloadedEntry>> {
        let _guard = self.write_lock.lock().await;

        let entries = self.all().await?;
        let entry = DownloadedEntry {
            asset_id,
            semver,
            folder_name,
        };

        let mut placed = false;
        let mut entries: Vec<DownloadedEntry> = entries
            .into_iter()
            .filter_map(|existing| {
                if existing.asset_id != asset_id {
                    Some(existing)
                } else if !placed {
                    placed = true;
                    Some(entry.clone())
                } else {
                    None
                }
            })
            .collect();
        if !placed {
            entries.push(entry);
        }

        self.store
            .set_typed(keys::DOWNLOADED_ASSET_VERSIONS, &entries)
            .await?;
        debug!(%asset_id, entries = entries.len(), "Updated version index entry");
        Ok(entries)
    }

    /// Drop the entry for `asset_id`; absent entries are fine
    pub async fn remove(&self, asset_id: Uuid) -> SyncResult<Vec<DownloadedEntry>> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.all().await?;
        let before = entries.len();
        entries.retain(|e| e.asset_id != asset_id);

        if entries.len() != before {
            self.store
                .set_typed(keys::DOWNLOADED_ASSET_VERSIONS, &entries)
                .await?;
            debug!(%asset_id, "Removed version index entry");
        }
        Ok(entries)
    }
}

impl fmt::Debug for VersionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionIndex")
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use griddle_store::MemoryStore;
    use serde_json::json;

    async fn index() -> (VersionIndex, MemoryStore) {
        let store = MemoryStore::new();
        let index = VersionIndex::open(Arc::new(store.clone())).await.unwrap();
        (index, store)
    }

    #[tokio::test]
    async fn test_empty_index() {
        let (index, _) = index().await;
        assert!(index.all().await.unwrap().is_empty());
        assert!(index.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let (index, _) = index().await;
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        index.upsert(a, Some("1.0".into()), "a_f".into()).await.unwrap();
        index.upsert(b, None, "b_f".into()).await.unwrap();
        let entries = index.upsert(a, Some("1.1".into()), "a_f".into()).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].asset_id, a);
        assert_eq!(entries[0].semver.as_deref(), Some("1.1"));
        assert_eq!(entries[1].asset_id, b);
    }

    #[tokio::test]
    async fn test_remove_idempotent() {
        let (index, _) = index().await;
        let a = Uuid::new_v4();
        index.upsert(a, None, "a_f".into()).await.unwrap();

        assert!(index.remove(a).await.unwrap().is_empty());
        assert!(index.remove(a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persisted_shape() {
        let (index, store) = index().await;
        let a = Uuid::parse_str("0b6f9a62-6b1e-4a40-9f3c-3d2f8e8f9a10").unwrap();
        index.upsert(a, None, "Chair_0b6f9a62".into()).await.unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(
            snapshot["downloadedAssetVersions"],
            json!([{
                "asset_id": "0b6f9a62-6b1e-4a40-9f3c-3d2f8e8f9a10",
                "semver": null,
                "folderName": "Chair_0b6f9a62"
            }])
        );
        assert_eq!(snapshot["schemaVersion"], json!(1));
    }

    #[tokio::test]
    async fn test_open_migrates_legacy_entries() {
        let id = "0b6f9a62-6b1e-4a40-9f3c-3d2f8e8f9a10";
        let mut legacy = serde_json::Map::new();
        legacy.insert(
            "versions".into(),
            json!([
                {"asset_id": id, "semver": "1.0", "folder_name": "Chair_0b6f9a62"},
                {"asset_id": id, "semver": "1.1", "folder_name": "Chair_0b6f9a62"}
            ]),
        );
        let store = MemoryStore::with_data(legacy);

        let index = VersionIndex::open(Arc::new(store)).await.unwrap();
        let entries = index.all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].semver.as_deref(), Some("1.1"));
        assert_eq!(entries[0].folder_name, "Chair_0b6f9a62");
    }

    #[tokio::test]
    async fn test_concurrent_upserts_keep_all_entries() {
        let (index, _) = index().await;
        let index = Arc::new(index);

        let mut handles = Vec::new();
        for i in 0..16 {
            let index = Arc::clone(&index);
            handles.push(tokio::spawn(async move {
                index
                    .upsert(Uuid::new_v4(), Some(format!("0.{}", i)), format!("f{}", i))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(index.all().await.unwrap().len(), 16);
    }
}
