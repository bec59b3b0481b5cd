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

//! Versioned migrations of persisted client state
//!
//! The store carries a `schemaVersion` key (absent means 0). On open, the
//! [`MigrationManager`] walks the document from its stored version to
//! [`CURRENT_SCHEMA_VERSION`] one step at a time, then writes back only the
//! keys that changed and bumps `schemaVersion` last. A run interrupted part
//! way through is safe to repeat.

use crate::error::{StoreError, StoreResult};
use crate::{keys, KeyValueStore};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Key holding the schema version of the store document
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";

/// Schema version written by this build
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Legacy key the old client appended version records to
const LEGACY_VERSIONS_KEY: &str = "versions";

/// One step of the persisted-state schema
pub trait StateMigration: Send + Sync {
    /// Get the source version this migration handles
    fn source_version(&self) -> u32;

    /// Get the target version after migration
    fn target_version(&self) -> u32;

    /// Transform the whole store document
    fn migrate(&self, state: Map<String, Value>) -> StoreResult<Map<String, Value>>;

    fn description(&self) -> &str;
}

/// Sequential migration runner
pub struct MigrationManager {
    migrations: HashMap<(u32, u32), Box<dyn StateMigration>>,
}

impl MigrationManager {
    pub fn new() -> Self {
        MigrationManager {
            migrations: HashMap::new(),
        }
    }

    /// Manager with every migration this build knows about
    pub fn with_builtin() -> Self {
        let mut manager = Self::new();
        manager.register(Box::new(MigrationV0ToV1));
        manager
    }

    pub fn register(&mut self, migration: Box<dyn StateMigration>) {
        let key = (migration.source_version(), migration.target_version());
        self.migrations.insert(key, migration);
    }

    /// Migrate a document from one version to another
    pub fn migrate(
        &self,
        mut state: Map<String, Value>,
        from_version: u32,
        to_version: u32,
    ) -> StoreResult<Map<String, Value>> {
        if from_version > to_version {
            return Err(StoreError::migration(format!(
                "store schema v{} is newer than supported v{}",
                from_version, to_version
            )));
        }

        let mut current = from_version;
        while current < to_version {
            let next = current + 1;
            let migration = self.migrations.get(&(current, next)).ok_or_else(|| {
                StoreError::migration(format!("no migration found from v{} to v{}", current, next))
            })?;

            debug!(
                "Applying store migration v{} -> v{}: {}",
                current,
                next,
                migration.description()
            );
            state = migration.migrate(state)?;
            current = next;
        }

        Ok(state)
    }

    /// Bring a live store up to [`CURRENT_SCHEMA_VERSION`]
    ///
    /// Returns the version the store was at before migrating.
    pub async fn run(&self, store: &dyn KeyValueStore) -> StoreResult<u32> {
        let from = stored_version(store).await?;
        if from == CURRENT_SCHEMA_VERSION {
            return Ok(from);
        }

        let mut before = Map::new();
        for key in store.keys().await? {
            if let Some(value) = store.get(&key).await? {
                before.insert(key, value);
            }
        }

        let mut after = self.migrate(before.clone(), from, CURRENT_SCHEMA_VERSION)?;
        after.remove(SCHEMA_VERSION_KEY);

        for (key, value) in &after {
            if before.get(key) != Some(value) {
                store.set(key, value.clone()).await?;
            }
        }
        for key in before.keys() {
            if key != SCHEMA_VERSION_KEY && !after.contains_key(key) {
                store.delete(key).await?;
            }
        }
        store
            .set(SCHEMA_VERSION_KEY, json!(CURRENT_SCHEMA_VERSION))
            .await?;

        info!(
            "Migrated store schema from v{} to v{}",
            from, CURRENT_SCHEMA_VERSION
        );
        Ok(from)
    }

    pub fn list_migrations(&self) -> Vec<String> {
        let mut migrations: Vec<_> = self
            .migrations
            .values()
            .map(|m| {
                format!(
                    "v{} -> v{}: {}",
                    m.source_version(),
                    m.target_version(),
                    m.description()
                )
            })
            .collect();
        migrations.sort();
        migrations
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn stored_version(store: &dyn KeyValueStore) -> StoreResult<u32> {
    match store.get(SCHEMA_VERSION_KEY).await? {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| StoreError::corrupt(SCHEMA_VERSION_KEY, format!("invalid version {}", n))),
        Some(other) => Err(StoreError::corrupt(
            SCHEMA_VERSION_KEY,
            format!("expected a number, got {}", other),
        )),
    }
}

/// v0 -> v1: single authoritative version index
///
/// - entries under the legacy `versions` key are folded into
///   `downloadedAssetVersions` (current entries take precedence)
/// - `folder_name` fields are renamed to `folderName`
/// - repeated entries for one asset collapse to the last one
pub struct MigrationV0ToV1;

impl MigrationV0ToV1 {
    fn entries(state: &mut Map<String, Value>, key: &str) -> StoreResult<Vec<Value>> {
        match state.remove(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(StoreError::corrupt(
                key,
                format!("expected an array, got {}", other),
            )),
        }
    }

    fn normalize(mut entry: Value) -> Option<(String, Value)> {
        let obj = entry.as_object_mut()?;
        if !obj.contains_key("folderName") {
            if let Some(folder) = obj.remove("folder_name") {
                obj.insert("folderName".to_string(), folder);
            }
        } else {
            obj.remove("folder_name");
        }
        if !obj.contains_key("semver") {
            obj.insert("semver".to_string(), Value::Null);
        }
        let asset_id = obj.get("asset_id")?.as_str()?.to_string();
        Some((asset_id, entry))
    }
}

impl StateMigration for MigrationV0ToV1 {
    fn source_version(&self) -> u32 {
        0
    }

    fn target_version(&self) -> u32 {
        1
    }

    fn migrate(&self, mut state: Map<String, Value>) -> StoreResult<Map<String, Value>> {
        let legacy = Self::entries(&mut state, LEGACY_VERSIONS_KEY)?;
        let current = Self::entries(&mut state, keys::DOWNLOADED_ASSET_VERSIONS)?;

        let mut merged: Vec<(String, Value)> = Vec::new();
        for raw in legacy.into_iter().chain(current) {
            match Self::normalize(raw) {
                Some((asset_id, entry)) => {
                    merged.retain(|(id, _)| *id != asset_id);
                    merged.push((asset_id, entry));
                }
                None => warn!("Dropping malformed version index entry during migration"),
            }
        }

        let entries: Vec<Value> = merged.into_iter().map(|(_, entry)| entry).collect();
        state.insert(
            keys::DOWNLOADED_ASSET_VERSIONS.to_string(),
            Value::Array(entries),
        );
        Ok(state)
    }

    fn description(&self) -> &str {
        "Fold legacy version records into a deduplicated downloadedAssetVersions index"
    }
}
