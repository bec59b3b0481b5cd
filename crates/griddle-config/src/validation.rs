use crate::error::{ConfigError, ConfigResult};
use crate::schema::*;

/// Validation for configuration sections
pub trait Validator {
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for GriddleConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.api.validate()?;
        self.storage.validate()?;
        self.observability.validate()?;
        for (name, launcher) in &self.launchers {
            if launcher.program.trim().is_empty() {
                return Err(ConfigError::MissingRequired(format!(
                    "launchers.{}.program",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl Validator for ApiConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::MissingRequired("api.base_url".to_string()));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::invalid_value(
                "api.base_url",
                format!("must start with http:// or https://, got {}", self.base_url),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "api.timeout_secs",
                "timeout must be at least 1 second",
            ));
        }

        Ok(())
    }
}

impl Validator for StorageConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.store_location.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired(
                "storage.store_location".to_string(),
            ));
        }

        if let Some(folder) = &self.download_folder {
            if folder.as_os_str().is_empty() {
                return Err(ConfigError::invalid_value(
                    "storage.download_folder",
                    "must not be empty when set",
                ));
            }
        }

        Ok(())
    }
}

impl Validator for ObservabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        // Directive lists such as "griddle_local=debug,warn" are accepted as-is.
        let is_directive = self.log_level.contains('=') || self.log_level.contains(',');
        if !is_directive && !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        Ok(())
    }
}
