//! Configuration schema.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Folder name used under the user's documents directory
pub const APP_FOLDER_NAME: &str = "Griddle";

/// Path prefix of the versioned asset API
pub const API_PREFIX: &str = "/api/v1";

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GriddleConfig {
    /// Remote asset API
    #[serde(default)]
    pub api: ApiConfig,

    /// Local state and download locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// External programs that can be launched on a materialized asset,
    /// keyed by a short name such as `houdini` or `maya`
    #[serde(default)]
    pub launchers: BTreeMap<String, LauncherConfig>,
}

impl GriddleConfig {
    /// Base URL of the versioned API, e.g. `http://localhost:8000/api/v1`
    pub fn api_root(&self) -> String {
        format!("{}{}", self.api.base_url.trim_end_matches('/'), API_PREFIX)
    }

    /// Folder under which asset working copies are materialized.
    ///
    /// Falls back to the store location when no explicit download folder is
    /// configured.
    pub fn download_folder(&self) -> PathBuf {
        self.storage
            .download_folder
            .clone()
            .unwrap_or_else(|| self.storage.store_location.clone())
    }

    /// Path of the persisted key-value store file
    pub fn store_file(&self) -> PathBuf {
        self.storage.store_location.join("store.json")
    }

    /// Look up a launcher by name
    pub fn launcher(&self, name: &str) -> Option<&LauncherConfig> {
        self.launchers.get(name)
    }

    /// Save the configuration as TOML
    pub async fn save(&self, path: impl AsRef<Path>) -> crate::ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| crate::ConfigError::SerializationError(e.to_string()))?;
        tokio::fs::write(path, toml_str).await?;
        Ok(())
    }
}

/// Remote asset API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server origin, without the `/api/v1` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds applied by the HTTP transport
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Local storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `store.json` (index, auth token, download root override)
    #[serde(default = "default_store_location")]
    pub store_location: PathBuf,

    /// Root folder for asset working copies; defaults to `store_location`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_folder: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            store_location: default_store_location(),
            download_folder: None,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Filter directive (`info`, `debug`, `griddle_local=trace,warn`, ...)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `pretty`, `compact` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        ObservabilityConfig {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// An external program launched against an asset folder.
///
/// Arguments may contain `{folder}` and `{asset_name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl LauncherConfig {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        LauncherConfig {
            program: program.into(),
            args,
        }
    }
}

/// `<Documents>/Griddle`, or `<home>/Griddle` on systems without a documents folder
pub fn default_store_location() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| {
            dirs.document_dir()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| dirs.home_dir().to_path_buf())
        })
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_FOLDER_NAME)
}

/// Default configuration file location (`<config dir>/griddle/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("griddle").join("config.toml"))
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
