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

//! Configuration management for the Griddle asset client
//!
//! Griddle reads a single client configuration describing where the asset
//! API lives, where local state and downloaded assets are kept, how logs are
//! emitted, and which external authoring tools can be launched on a
//! materialized asset folder.
//!
//! # Features
//!
//! - TOML, YAML and JSON configuration files
//! - Environment variable overrides with the `GRIDDLE_` prefix
//! - Validation with field-specific error messages
//! - Platform defaults (`<Documents>/Griddle`) when no file exists
//!
//! # Example
//!
//! ```no_run
//! use griddle_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ConfigLoader::new();
//!     let config = loader.load_or_default("griddle.toml").await?;
//!
//!     println!("API: {}", config.api.base_url);
//!     println!("Downloads: {}", config.download_folder().display());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader};
pub use schema::*;
pub use validation::Validator;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GriddleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_config_serialization() {
        let config = GriddleConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("base_url"));
        assert!(json.contains("store_location"));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = GriddleConfig::default();
        config.observability.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }
}
