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

// End-to-end tests for the sync engine against an in-memory remote and store

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use griddle_local::{
    archive, AssetStatus, FingerprintStore, LaunchRequest, Launcher, SyncEngine, SyncEngineConfig,
    SyncError, SyncResult,
};
use griddle_remote::{Asset, MockRemote};
use griddle_store::MemoryStore;
use griddle_test_utils::{assert_dir_empty, assert_trees_equal, AssetTree, TestFixtures};
use tempfile::TempDir;
use uuid::Uuid;

struct Harness {
    dir: TempDir,
    root: PathBuf,
    store: MemoryStore,
    remote: MockRemote,
    engine: SyncEngine,
}

impl Harness {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("Griddle");
        let store = MemoryStore::new();
        let remote = MockRemote::new();
        let engine = SyncEngine::open(
            SyncEngineConfig::new(&root),
            Arc::new(store.clone()),
            Arc::new(remote.clone()),
        )
        .await
        .unwrap();

        Self {
            dir,
            root,
            store,
            remote,
            engine,
        }
    }

    /// Asset with versions 1.0 and 1.1 (1.1 latest)
    async fn asset_with_two_versions(&self, name: &str) -> (Asset, AssetTree, AssetTree) {
        let asset = self.remote.add_asset(name).await;
        let v10 = AssetTree::sample(name).file("stale.txt", "only in 1.0");
        let v11 = AssetTree::sample(name).file("notes.txt", "added in 1.1");
        self.remote
            .add_version(asset.id, "1.0", "initial", v10.to_archive())
            .await
            .unwrap();
        self.remote
            .add_version(asset.id, "1.1", "notes", v11.to_archive())
            .await
            .unwrap();
        (asset, v10, v11)
    }

    fn folder(&self, asset: &Asset) -> PathBuf {
        let id = asset.id.to_string();
        self.root.join(format!("{}_{}", asset.asset_name, &id[..8]))
    }

    fn fingerprint_bytes(&self, asset_id: Uuid) -> Option<Vec<u8>> {
        fs::read(FingerprintStore::new(&self.root).path_for(asset_id)).ok()
    }
}

#[tokio::test]
async fn asset_without_versions_gets_empty_folder() {
    let h = Harness::new().await;
    let asset = h.remote.add_asset("Chair").await;

    let entries = h.engine.ensure_materialized(asset.id, None).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].asset_id, asset.id);
    assert_eq!(entries[0].semver, None);
    assert_eq!(entries[0].folder_name, format!("Chair_{}", &asset.id.to_string()[..8]));
    assert_dir_empty(&h.folder(&asset));
    assert!(h.fingerprint_bytes(asset.id).is_some());
    assert!(!h.engine.is_dirty(asset.id).await.unwrap());
    assert_eq!(h.remote.download_count(), 0);
}

#[tokio::test]
async fn create_initial_version_matches_empty_materialize() {
    let h = Harness::new().await;
    let asset = h.remote.add_asset("Lamp").await;

    let entries = h.engine.create_initial_version(asset.id).await.unwrap();
    assert_eq!(entries[0].semver, None);
    assert_eq!(
        h.engine.status(asset.id).await.unwrap(),
        AssetStatus::Clean { semver: None }
    );
}

#[tokio::test]
async fn explicit_version_of_versionless_asset_is_not_found() {
    let h = Harness::new().await;
    let asset = h.remote.add_asset("Chair").await;

    let err = h
        .engine
        .ensure_materialized(asset.id, Some("1.0"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(h.engine.list_downloaded().await.unwrap().is_empty());
    assert!(!h.folder(&asset).exists());
}

#[tokio::test]
async fn latest_version_replaces_prior_contents() {
    let h = Harness::new().await;
    let (asset, v10, v11) = h.asset_with_two_versions("Chair").await;

    h.engine.ensure_materialized(asset.id, Some("1.0")).await.unwrap();
    assert_trees_equal(&h.folder(&asset), v10.materialize().path());

    let entries = h.engine.ensure_materialized(asset.id, None).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].semver.as_deref(), Some("1.1"));
    assert_trees_equal(&h.folder(&asset), v11.materialize().path());
    assert!(!h.folder(&asset).join("stale.txt").exists());
    assert!(!h.engine.is_dirty(asset.id).await.unwrap());
}

#[tokio::test]
async fn unknown_version_fails_before_download() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;

    let err = h
        .engine
        .ensure_materialized(asset.id, Some("9.9"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(h.remote.download_count(), 0);
    assert!(h.engine.list_downloaded().await.unwrap().is_empty());
}

#[tokio::test]
async fn old_versions_beyond_asset_info_are_reachable() {
    let h = Harness::new().await;
    let asset = h.remote.add_asset("Rock").await;
    for tag in ["0.1", "0.2", "0.3", "0.4"] {
        let tree = AssetTree::new().file("version.txt", tag);
        h.remote
            .add_version(asset.id, tag, "m", tree.to_archive())
            .await
            .unwrap();
    }

    let entries = h.engine.ensure_materialized(asset.id, Some("0.1")).await.unwrap();
    assert_eq!(entries[0].semver.as_deref(), Some("0.1"));
    assert_eq!(fs::read(h.folder(&asset).join("version.txt")).unwrap(), b"0.1");
}

#[tokio::test]
async fn versions_past_the_first_listing_page_are_reachable() {
    let h = Harness::new().await;
    let asset = h.remote.add_asset("Crate").await;
    for minor in 1..=30 {
        let tag = format!("0.{}", minor);
        let tree = AssetTree::new().file("version.txt", tag.as_str());
        h.remote
            .add_version(asset.id, &tag, "m", tree.to_archive())
            .await
            .unwrap();
    }

    let entries = h.engine.ensure_materialized(asset.id, Some("0.2")).await.unwrap();
    assert_eq!(entries[0].semver.as_deref(), Some("0.2"));
    assert_eq!(fs::read(h.folder(&asset).join("version.txt")).unwrap(), b"0.2");
}

#[tokio::test]
async fn commit_uploads_and_advances_version() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    h.engine.ensure_materialized(asset.id, None).await.unwrap();

    let folder = h.folder(&asset);
    fs::write(folder.join("prop.usda"), TestFixtures::usda_stage("Prop")).unwrap();
    assert!(h.engine.is_dirty(asset.id).await.unwrap());

    let entries = h.engine.commit(asset.id, "add prop", false).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].semver.as_deref(), Some("1.2"));
    assert_eq!(h.folder(&asset), h.root.join(&entries[0].folder_name));
    assert!(folder.join("prop.usda").exists());
    assert!(!h.engine.is_dirty(asset.id).await.unwrap());
    assert_eq!(h.remote.upload_count(), 1);

    // what was uploaded is exactly the working copy
    let uploaded = h.remote.archive(asset.id, "1.2").await.unwrap();
    let check = TempDir::new().unwrap();
    archive::unpack(uploaded, check.path().join("out")).await.unwrap();
    assert_trees_equal(&folder, &check.path().join("out"));
}

#[tokio::test]
async fn major_commit_bumps_major() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    h.engine.ensure_materialized(asset.id, None).await.unwrap();

    let entries = h.engine.commit(asset.id, "rebuild", true).await.unwrap();
    assert_eq!(entries[0].semver.as_deref(), Some("2.0"));
}

#[tokio::test]
async fn first_commit_of_new_asset_is_0_1() {
    let h = Harness::new().await;
    let asset = h.remote.add_asset("Table").await;
    h.engine.create_initial_version(asset.id).await.unwrap();

    fs::write(h.folder(&asset).join("table.usda"), TestFixtures::usda_stage("Table")).unwrap();
    let entries = h.engine.commit(asset.id, "first", false).await.unwrap();
    assert_eq!(entries[0].semver.as_deref(), Some("0.1"));
}

#[tokio::test]
async fn commit_without_local_copy_is_not_found() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;

    let err = h.engine.commit(asset.id, "nothing", false).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(h.remote.upload_count(), 0);
    assert!(h.engine.list_downloaded().await.unwrap().is_empty());
}

#[tokio::test]
async fn commit_with_missing_folder_is_not_found() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    h.engine.ensure_materialized(asset.id, None).await.unwrap();
    fs::remove_dir_all(h.folder(&asset)).unwrap();

    let err = h.engine.commit(asset.id, "gone", false).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(h.remote.upload_count(), 0);
}

#[tokio::test]
async fn empty_commit_message_is_rejected() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    h.engine.ensure_materialized(asset.id, None).await.unwrap();

    let err = h.engine.commit(asset.id, "   ", false).await.unwrap_err();
    assert!(matches!(err, SyncError::InvalidInput(_)));
    assert_eq!(h.remote.upload_count(), 0);
}

#[tokio::test]
async fn failed_upload_changes_nothing() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    h.engine.ensure_materialized(asset.id, None).await.unwrap();

    let folder = h.folder(&asset);
    fs::write(folder.join("wip.txt"), b"work in progress").unwrap();
    let index_before = h.engine.list_downloaded().await.unwrap();
    let fingerprint_before = h.fingerprint_bytes(asset.id);

    h.remote.set_fail_uploads(true);
    let err = h.engine.commit(asset.id, "try", false).await.unwrap_err();
    assert_eq!(err.kind(), "remote_rejected");

    assert_eq!(h.engine.list_downloaded().await.unwrap(), index_before);
    assert_eq!(h.fingerprint_bytes(asset.id), fingerprint_before);
    assert_eq!(fs::read(folder.join("wip.txt")).unwrap(), b"work in progress");
    assert!(h.engine.is_dirty(asset.id).await.unwrap());
}

#[tokio::test]
async fn dirty_after_add_modify_remove() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    let folder = h.folder(&asset);

    h.engine.ensure_materialized(asset.id, None).await.unwrap();
    fs::write(folder.join("extra.txt"), b"new").unwrap();
    assert!(h.engine.is_dirty(asset.id).await.unwrap());

    h.engine.ensure_materialized(asset.id, None).await.unwrap();
    assert!(!h.engine.is_dirty(asset.id).await.unwrap());
    fs::write(folder.join("notes.txt"), b"changed").unwrap();
    assert!(h.engine.is_dirty(asset.id).await.unwrap());

    h.engine.ensure_materialized(asset.id, None).await.unwrap();
    fs::remove_file(folder.join("notes.txt")).unwrap();
    assert!(h.engine.is_dirty(asset.id).await.unwrap());
    assert_eq!(
        h.engine.status(asset.id).await.unwrap(),
        AssetStatus::Dirty {
            semver: Some("1.1".into())
        }
    );
}

#[tokio::test]
async fn missing_fingerprint_reads_as_dirty() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    h.engine.ensure_materialized(asset.id, None).await.unwrap();

    FingerprintStore::new(&h.root).remove(asset.id).await.unwrap();
    assert!(h.engine.is_dirty(asset.id).await.unwrap());
}

#[tokio::test]
async fn dirty_check_requires_local_copy() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;

    assert!(h.engine.is_dirty(asset.id).await.unwrap_err().is_not_found());
    assert_eq!(h.engine.status(asset.id).await.unwrap(), AssetStatus::NoLocalCopy);

    h.engine.ensure_materialized(asset.id, None).await.unwrap();
    fs::remove_dir_all(h.folder(&asset)).unwrap();
    assert!(h.engine.is_dirty(asset.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn unsync_is_idempotent() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    h.engine.ensure_materialized(asset.id, None).await.unwrap();

    assert!(h.engine.unsync(asset.id).await.unwrap().is_empty());
    assert!(!h.folder(&asset).exists());
    assert!(h.fingerprint_bytes(asset.id).is_none());

    assert!(h.engine.unsync(asset.id).await.unwrap().is_empty());
    assert!(h.engine.unsync(Uuid::new_v4()).await.unwrap().is_empty());
    assert_eq!(h.engine.status(asset.id).await.unwrap(), AssetStatus::NoLocalCopy);
}

#[tokio::test]
async fn unsync_tolerates_missing_folder() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    h.engine.ensure_materialized(asset.id, None).await.unwrap();
    fs::remove_dir_all(h.folder(&asset)).unwrap();

    assert!(h.engine.unsync(asset.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_syncs_of_different_assets() {
    let h = Harness::new().await;
    let (a, _, _) = h.asset_with_two_versions("Chair").await;
    let (b, _, _) = h.asset_with_two_versions("Lamp").await;

    let (ra, rb) = tokio::join!(
        h.engine.ensure_materialized(a.id, None),
        h.engine.ensure_materialized(b.id, Some("1.0")),
    );
    ra.unwrap();
    rb.unwrap();

    let entries = h.engine.list_downloaded().await.unwrap();
    assert_eq!(entries.len(), 2);
    let find = |id: Uuid| entries.iter().find(|e| e.asset_id == id).unwrap();
    assert_eq!(find(a.id).semver.as_deref(), Some("1.1"));
    assert_eq!(find(b.id).semver.as_deref(), Some("1.0"));
    assert!(h.folder(&a).is_dir());
    assert!(h.folder(&b).is_dir());
}

#[tokio::test]
async fn corrupt_archive_leaves_working_copy_untouched() {
    let h = Harness::new().await;
    let asset = h.remote.add_asset("Chair").await;
    let good = AssetTree::sample("Chair");
    h.remote
        .add_version(asset.id, "1.0", "good", good.to_archive())
        .await
        .unwrap();
    h.engine.ensure_materialized(asset.id, None).await.unwrap();

    h.remote
        .add_version(asset.id, "1.1", "broken", b"this is not an archive".to_vec())
        .await
        .unwrap();
    let err = h.engine.ensure_materialized(asset.id, None).await.unwrap_err();
    assert_eq!(err.kind(), "format");

    assert_trees_equal(&h.folder(&asset), good.materialize().path());
    let entries = h.engine.list_downloaded().await.unwrap();
    assert_eq!(entries[0].semver.as_deref(), Some("1.0"));
    assert!(!h.engine.is_dirty(asset.id).await.unwrap());
}

#[tokio::test]
async fn failed_download_changes_nothing() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;

    h.remote.set_fail_downloads(true);
    assert!(h.engine.ensure_materialized(asset.id, None).await.is_err());
    assert!(h.engine.list_downloaded().await.unwrap().is_empty());
    assert!(!h.folder(&asset).exists());
}

#[tokio::test]
async fn renamed_asset_moves_folder() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    h.engine.ensure_materialized(asset.id, None).await.unwrap();
    let old_folder = h.folder(&asset);

    h.remote.rename_asset(asset.id, "Armchair").await.unwrap();
    let entries = h.engine.ensure_materialized(asset.id, None).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert!(entries[0].folder_name.starts_with("Armchair_"));
    assert!(h.root.join(&entries[0].folder_name).is_dir());
    assert!(!old_folder.exists());
}

#[tokio::test]
async fn unknown_asset_is_not_found() {
    let h = Harness::new().await;
    let err = h.engine.ensure_materialized(Uuid::new_v4(), None).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn download_root_is_persisted() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    h.engine.ensure_materialized(asset.id, None).await.unwrap();

    let elsewhere = h.dir.path().join("Elsewhere");
    h.engine.set_download_root(&elsewhere).await.unwrap();
    assert_eq!(h.engine.download_root().await, elsewhere);

    // existing folders are not moved
    assert!(h.folder(&asset).is_dir());
    assert!(h.engine.local_folder(asset.id).await.unwrap_err().is_not_found());

    let reopened = SyncEngine::open(
        SyncEngineConfig::new(&h.root),
        Arc::new(h.store.clone()),
        Arc::new(h.remote.clone()),
    )
    .await
    .unwrap();
    assert_eq!(reopened.download_root().await, elsewhere);

    assert!(matches!(
        h.engine.set_download_root("relative/path").await,
        Err(SyncError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn unsync_after_root_change_forgets_but_keeps_old_folder() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    h.engine.ensure_materialized(asset.id, None).await.unwrap();
    h.engine
        .set_download_root(h.dir.path().join("Elsewhere"))
        .await
        .unwrap();

    assert!(h.engine.unsync(asset.id).await.unwrap().is_empty());
    assert_eq!(h.engine.status(asset.id).await.unwrap(), AssetStatus::NoLocalCopy);
    assert!(h.folder(&asset).join("Chair.usda").is_file());
}

#[tokio::test]
async fn local_files_and_folder() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    h.engine.ensure_materialized(asset.id, None).await.unwrap();

    assert_eq!(h.engine.local_folder(asset.id).await.unwrap(), h.folder(&asset));
    let files: Vec<String> = h
        .engine
        .list_local_files(asset.id)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.path)
        .collect();
    assert_eq!(files, vec!["Chair.usda", "notes.txt", "textures/albedo.png"]);
}

#[derive(Debug, Default)]
struct RecordingLauncher {
    requests: Mutex<Vec<LaunchRequest>>,
}

#[async_trait]
impl Launcher for RecordingLauncher {
    async fn launch(&self, request: &LaunchRequest) -> SyncResult<()> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

#[tokio::test]
async fn launch_hands_over_folder_and_name() {
    let h = Harness::new().await;
    let (asset, _, _) = h.asset_with_two_versions("Chair").await;
    let launcher = RecordingLauncher::default();

    assert!(h.engine.launch(asset.id, &launcher).await.unwrap_err().is_not_found());

    h.engine.ensure_materialized(asset.id, None).await.unwrap();
    h.engine.launch(asset.id, &launcher).await.unwrap();

    let requests = launcher.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].folder, h.folder(&asset));
    assert_eq!(requests[0].asset_name, "Chair");
}
