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

//! Persisted client state for Griddle
//!
//! The sync engine keeps a handful of small, durable values: the local version
//! index, the download-root override and the API bearer token. This crate
//! abstracts them behind the [`KeyValueStore`] capability so the engine can be
//! driven by a JSON file in production and an in-memory map in tests.
//!
//! # Backends
//!
//! - [`JsonFileStore`]: one JSON object on disk, rewritten atomically on every
//!   change (temp file + rename)
//! - [`MemoryStore`]: `Arc<RwLock<Map>>`, cloneable, for tests
//!
//! # Examples
//!
//! ```rust,no_run
//! use griddle_store::{KeyValueStore, KeyValueStoreExt, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> griddle_store::StoreResult<()> {
//!     let store = MemoryStore::new();
//!     store.set_typed("authToken", &"abc123").await?;
//!
//!     let token: Option<String> = store.get_typed("authToken").await?;
//!     assert_eq!(token.as_deref(), Some("abc123"));
//!
//!     store.delete("authToken").await?;
//!     assert!(store.get("authToken").await?.is_none());
//!     Ok(())
//! }
//! ```
//!
//! # Implementation Guide
//!
//! 1. Use `#[async_trait]` on the impl block
//! 2. `get` of a missing key is `Ok(None)`, not an error
//! 3. `delete` of a missing key succeeds (idempotent)
//! 4. Empty keys are rejected with [`StoreError::InvalidKey`]

pub mod error;
pub mod file;
pub mod memory;
pub mod migration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use migration::{
    MigrationManager, MigrationV0ToV1, StateMigration, CURRENT_SCHEMA_VERSION, SCHEMA_VERSION_KEY,
};

/// Well-known keys of the client store
pub mod keys {
    /// The local version index (`DownloadedEntry[]`)
    pub const DOWNLOADED_ASSET_VERSIONS: &str = "downloadedAssetVersions";
    /// Download-root override set through the engine
    pub const DOWNLOAD_FOLDER: &str = "downloadFolder";
    /// Bearer token for the asset API, `null` when logged out
    pub const AUTH_TOKEN: &str = "authToken";
}

/// Durable key-value capability.
///
/// Values are JSON documents. Implementations must be `Send + Sync` so one
/// store can be shared by concurrent engine operations.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read a value; `Ok(None)` if the key is absent
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Insert or replace a value
    async fn set(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Remove a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// All keys, sorted
    async fn keys(&self) -> StoreResult<Vec<String>>;
}

/// Typed accessors layered over [`KeyValueStore`]
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    async fn get_typed<T: DeserializeOwned + Send>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get(key).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::corrupt(key, e.to_string())),
        }
    }

    async fn set_typed<T: Serialize + Sync>(&self, key: &str, value: &T) -> StoreResult<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value).await
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key cannot be empty".to_string()));
    }
    Ok(())
}
