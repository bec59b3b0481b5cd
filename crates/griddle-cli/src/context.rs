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

//! Process-wide wiring: config, store, remote and sync engine.

use crate::ipc::Dispatcher;
use crate::progress::ProgressTracker;
use anyhow::{Context, Result};
use griddle_config::{default_config_path, ConfigLoader, GriddleConfig, Validator};
use griddle_local::{SyncEngine, SyncEngineConfig};
use griddle_remote::{HttpRemote, RemoteConfig, Token};
use griddle_store::{keys, JsonFileStore, KeyValueStore, KeyValueStoreExt};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Everything a command needs, opened once per process
#[derive(Debug)]
pub struct AppContext {
    config: GriddleConfig,
    store: Arc<JsonFileStore>,
    remote: Arc<HttpRemote>,
    engine: Arc<SyncEngine>,
    progress: ProgressTracker,
}

impl AppContext {
    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist. The default location is optional; without
    /// it the built-in defaults are used. `GRIDDLE_*` overrides apply either way.
    pub async fn load_config(path: Option<&Path>) -> Result<GriddleConfig> {
        let loader = ConfigLoader::new();
        let config = match path {
            Some(path) => {
                let mut config = loader
                    .load_file(path)
                    .await
                    .with_context(|| format!("Failed to load config {}", path.display()))?;
                loader.apply_env_overrides(&mut config)?;
                config.validate()?;
                config
            }
            None => match default_config_path() {
                Some(path) => loader.load_or_default(&path).await?,
                None => {
                    let mut config = GriddleConfig::default();
                    loader.apply_env_overrides(&mut config)?;
                    config.validate()?;
                    config
                }
            },
        };
        Ok(config)
    }

    /// Open the store, restore the saved auth token and start the engine
    pub async fn open(config: GriddleConfig, quiet: bool) -> Result<Self> {
        let store_file = config.store_file();
        let store = Arc::new(
            JsonFileStore::open(&store_file)
                .await
                .with_context(|| format!("Failed to open store {}", store_file.display()))?,
        );

        let token: Option<String> = store.get_typed(keys::AUTH_TOKEN).await?;
        debug!(logged_in = token.is_some(), "Restored session");

        let remote = Arc::new(HttpRemote::new(
            RemoteConfig::new(config.api_root())
                .with_timeout(Duration::from_secs(config.api.timeout_secs))
                .with_token(token),
        )?);

        let engine = SyncEngine::open(
            SyncEngineConfig::new(config.download_folder()),
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
            Arc::clone(&remote) as Arc<dyn griddle_remote::RemoteRepository>,
        )
        .await?;

        Ok(Self {
            config,
            store,
            remote,
            engine: Arc::new(engine),
            progress: ProgressTracker::new(quiet),
        })
    }

    pub fn config(&self) -> &GriddleConfig {
        &self.config
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn remote(&self) -> &HttpRemote {
        &self.remote
    }

    pub fn progress(&self) -> ProgressTracker {
        self.progress
    }

    /// Request dispatcher sharing this context's engine
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(Arc::clone(&self.engine), self.config.launchers.clone())
    }

    /// Log in and remember the token for later invocations
    pub async fn login(&self, username: &str, password: &str) -> Result<Token> {
        let token = self.remote.login(username, password).await?;
        self.store
            .set_typed(keys::AUTH_TOKEN, &token.access_token)
            .await
            .context("Failed to save auth token")?;
        info!(username, "Logged in");
        Ok(token)
    }

    /// Forget the saved token
    pub async fn logout(&self) -> Result<()> {
        self.remote.logout();
        self.store
            .set(keys::AUTH_TOKEN, Value::Null)
            .await
            .context("Failed to clear auth token")?;
        info!("Logged out");
        Ok(())
    }
}
