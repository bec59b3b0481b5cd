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

//! In-memory store for tests
//!
//! ```rust,no_run
//! use griddle_store::{KeyValueStore, MemoryStore};
//!
//! # #[tokio::main]
//! # async fn main() -> griddle_store::StoreResult<()> {
//! let store = MemoryStore::new();
//! store.set("downloadFolder", serde_json::json!("/tmp/griddle")).await?;
//! assert_eq!(store.len().await, 1);
//! # Ok(())
//! # }
//! ```

use crate::{validate_key, KeyValueStore, StoreResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory store. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    values: Arc<RwLock<Map<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. with a legacy-shaped document for migration tests
    pub fn with_data(initial: Map<String, Value>) -> Self {
        MemoryStore {
            values: Arc::new(RwLock::new(initial)),
        }
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }

    /// Copy of the whole document
    pub async fn snapshot(&self) -> Map<String, Value> {
        self.values.read().await.clone()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore").finish()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        validate_key(key)?;
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        validate_key(key)?;
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.values.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys: Vec<String> = self.values.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
