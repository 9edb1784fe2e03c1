//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an absolute http(s) URL
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `image_timeout_ms` is less than 100ms or exceeds 1 minute
    /// - `user_agent`, `cache_prefix` or `cache_version` is empty
    /// - a precache entry does not resolve against the origin
    ///
    /// Returns `ConfigError::Missing` if `offline_document` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.origin_url()?;

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.image_timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "image_timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.image_timeout_ms > 60_000 {
            return Err(ConfigError::Invalid {
                field: "image_timeout_ms".into(),
                reason: "must not exceed 1 minute (60000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }
        if self.cache_prefix.is_empty() {
            return Err(ConfigError::Invalid { field: "cache_prefix".into(), reason: "must not be empty".into() });
        }
        if self.cache_version.is_empty() {
            return Err(ConfigError::Invalid { field: "cache_version".into(), reason: "must not be empty".into() });
        }

        if self.offline_document.is_empty() {
            return Err(ConfigError::Missing {
                field: "offline_document".into(),
                hint: "Set NAMMY_OFFLINE_DOCUMENT, e.g. /index.html".into(),
            });
        }

        self.precache_manifest()?;

        if self.image_timeout_ms > self.timeout_ms {
            tracing::warn!(
                image_timeout_ms = self.image_timeout_ms,
                timeout_ms = self.timeout_ms,
                "image_timeout_ms exceeds timeout_ms; the client timeout fires first"
            );
        }

        Ok(())
    }
}
