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

use std::path::PathBuf;
use thiserror::Error;

/// Errors loading, validating or saving client configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML in config: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Invalid YAML in config: {0}")]
    YamlParseError(#[from] serde_yaml::Error),

    #[error("Invalid JSON in config: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Failed to write config: {0}")]
    SerializationError(String),

    #[error("Unsupported config extension .{0} (use .toml, .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("No config file at {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Config path {} has no extension", .0.display())]
    InvalidPath(PathBuf),

    #[error("Bad value in {variable_name}={value}: {reason}")]
    EnvVarParsingError {
        variable_name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing required setting {0}")]
    MissingRequired(String),
}

impl ConfigError {
    pub fn env_var_parsing_error(
        variable_name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::EnvVarParsingError {
            variable_name: variable_name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
