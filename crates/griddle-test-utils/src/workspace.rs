// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Griddle Contributors

//! Sandboxed client workspace.

use crate::cli::griddle;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory laid out like a client installation:
///
/// ```text
/// <tmp>/config.toml
/// <tmp>/store/store.json
/// <tmp>/downloads/
/// ```
///
/// Commands built with [`TestWorkspace::command`] point at this config and
/// never touch the real user directories.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Create a workspace whose API points at `api_url`.
    pub fn new(api_url: &str) -> Self {
        let ws = Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        };
        fs::create_dir_all(ws.download_root()).expect("Failed to create download root");
        ws.write_config(api_url);
        ws
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    pub fn store_location(&self) -> PathBuf {
        self.path().join("store")
    }

    pub fn download_root(&self) -> PathBuf {
        self.path().join("downloads")
    }

    fn write_config(&self, api_url: &str) {
        let config = format!(
            "[api]\nbase_url = \"{}\"\ntimeout_secs = 5\n\n[storage]\nstore_location = {:?}\ndownload_folder = {:?}\n\n[observability]\nlog_level = \"warn\"\nlog_format = \"compact\"\n",
            api_url,
            self.store_location().to_string_lossy(),
            self.download_root().to_string_lossy(),
        );
        fs::write(self.config_path(), config).expect("Failed to write config");
    }

    /// `griddle --config <ws>/config.toml` with `GRIDDLE_*` overrides cleared.
    pub fn command(&self) -> Command {
        let mut cmd = griddle();
        for key in [
            "GRIDDLE_API_URL",
            "GRIDDLE_API_TIMEOUT_SECS",
            "GRIDDLE_STORE_LOCATION",
            "GRIDDLE_DOWNLOAD_FOLDER",
            "GRIDDLE_LOG_LEVEL",
            "GRIDDLE_LOG_FORMAT",
        ] {
            cmd.env_remove(key);
        }
        cmd.arg("--config").arg(self.config_path());
        cmd
    }

    /// Write a file inside the download root.
    pub fn write_file(&self, rel: &str, content: &[u8]) {
        let path = self.download_root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
    }
}
