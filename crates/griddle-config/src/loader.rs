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

use crate::error::{ConfigError, ConfigResult};
use crate::schema::GriddleConfig;
use crate::validation::Validator;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<GriddleConfig> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).await?;

        info!(
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );

        self.load_from_string(&content, format)
    }

    /// Load configuration from a string
    pub fn load_from_string(
        &self,
        content: &str,
        format: ConfigFormat,
    ) -> ConfigResult<GriddleConfig> {
        let config: GriddleConfig = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };

        if self.validate {
            config.validate()?;
        }

        Ok(config)
    }

    /// Load the file if it exists, otherwise start from defaults; environment
    /// overrides are applied in both cases.
    pub async fn load_or_default<P: AsRef<Path>>(&self, path: P) -> ConfigResult<GriddleConfig> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            self.load_file(path).await?
        } else {
            debug!(
                "No configuration at {}, using defaults",
                path.display()
            );
            GriddleConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        if self.validate {
            config.validate()?;
        }
        Ok(config)
    }

    /// Apply `GRIDDLE_*` environment variable overrides
    pub fn apply_env_overrides(&self, config: &mut GriddleConfig) -> ConfigResult<()> {
        apply_overrides_from(config, |name| std::env::var(name).ok())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply overrides using an arbitrary variable lookup
pub fn apply_overrides_from<F>(config: &mut GriddleConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("GRIDDLE_API_URL") {
        config.api.base_url = value;
    }
    if let Some(value) = lookup("GRIDDLE_API_TIMEOUT_SECS") {
        config.api.timeout_secs = value.parse().map_err(|_| {
            ConfigError::env_var_parsing_error(
                "GRIDDLE_API_TIMEOUT_SECS",
                &value,
                "expected a whole number of seconds",
            )
        })?;
    }
    if let Some(value) = lookup("GRIDDLE_STORE_LOCATION") {
        config.storage.store_location = PathBuf::from(value);
    }
    if let Some(value) = lookup("GRIDDLE_DOWNLOAD_FOLDER") {
        config.storage.download_folder = Some(PathBuf::from(value));
    }
    if let Some(value) = lookup("GRIDDLE_LOG_LEVEL") {
        config.observability.log_level = value;
    }
    if let Some(value) = lookup("GRIDDLE_LOG_FORMAT") {
        config.observability.log_format = value;
    }
    Ok(())
}
