//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_upload_bytes must be > 0".into(),
            ));
        }
        if self.limits.max_processed_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_processed_bytes must be > 0".into(),
            ));
        }
        if self.limits.max_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_dimension must be > 0".into(),
            ));
        }
        if self.limits.max_decode_alloc_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_decode_alloc_bytes must be > 0".into(),
            ));
        }
        if self.limits.process_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.process_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_concurrent == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_concurrent must be > 0".into(),
            ));
        }
        if !(1..=100).contains(&self.encode.quality) {
            return Err(ConfigError::ValidationError(
                "encode.quality must be between 1 and 100".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}
