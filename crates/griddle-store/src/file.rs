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

//! File-backed JSON store
//!
//! The whole store is a single JSON object on disk, mirrored in memory.
//! Every mutation rewrites the file atomically:
//!
//! 1. Serialize the updated document to `<file>.tmp`
//! 2. Rename over `<file>`
//!
//! The in-memory map is only updated after the rename succeeds, so a failed
//! write leaves both the file and the visible state untouched.
//!
//! # Examples
//!
//! ```rust,no_run
//! use griddle_store::{JsonFileStore, KeyValueStore};
//!
//! # #[tokio::main]
//! # async fn main() -> griddle_store::StoreResult<()> {
//! let store = JsonFileStore::open("/home/me/Documents/Griddle/store.json").await?;
//! store.set("downloadFolder", serde_json::json!("/mnt/assets")).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{StoreError, StoreResult};
use crate::{validate_key, KeyValueStore};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// JSON document store persisted to a single file
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`
    ///
    /// A missing file is an empty store; the file and its parent directory are
    /// created on first write. A file that is not a JSON object is reported as
    /// [`StoreError::Corrupt`].
    pub async fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let values = match fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Map::new(),
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(StoreError::corrupt(
                        path.display().to_string(),
                        "top-level value is not an object",
                    ))
                }
                Err(e) => {
                    return Err(StoreError::corrupt(path.display().to_string(), e.to_string()))
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        debug!(path = %path.display(), keys = values.len(), "Opened JSON store");

        Ok(JsonFileStore {
            path,
            values: RwLock::new(values),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, values: &Map<String, Value>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(values)?;
        let temp_path = self.path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StoreError::Io(e));
        }

        trace!(path = %self.path.display(), bytes = bytes.len(), "Persisted JSON store");
        Ok(())
    }
}

impl fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .finish()
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        validate_key(key)?;
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        validate_key(key)?;
        // Writer lock is held across the file write so updates hit disk in order
        let mut values = self.values.write().await;
        let mut next = values.clone();
        next.insert(key.to_string(), value);
        self.persist(&next).await?;
        *values = next;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        let mut values = self.values.write().await;
        if !values.contains_key(key) {
            return Ok(());
        }
        let mut next = values.clone();
        next.remove(key);
        self.persist(&next).await?;
        *values = next;
        Ok(())
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys: Vec<String> = self.values.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
