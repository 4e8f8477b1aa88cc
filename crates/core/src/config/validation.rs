//! Configuration validation rules.
//!
//! This module provides validation logic for `CoordinatorConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::CoordinatorConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl CoordinatorConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `version_tag` is empty or contains whitespace
    /// - `origin_url` is not http(s) or its path lacks a trailing '/'
    /// - any manifest, navigation, or prefix path is not site-absolute
    /// - route prefixes lack a trailing '/'
    /// - `offline_document_path` is missing from the shell manifest
    /// - `timeout_ms` is out of bounds
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version_tag.is_empty() || self.version_tag.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "version_tag".into(),
                reason: "must be non-empty with no whitespace".into(),
            });
        }

        match self.origin_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ConfigError::Invalid {
                    field: "origin_url".into(),
                    reason: format!("unsupported scheme: {scheme}"),
                });
            }
        }
        if !self.origin_url.path().ends_with('/') {
            return Err(ConfigError::Invalid {
                field: "origin_url".into(),
                reason: "path must end with '/' (deployment base)".into(),
            });
        }

        let path_lists = [
            ("shell_manifest", &self.shell_manifest),
            ("asset_manifest", &self.asset_manifest),
            ("data_manifest", &self.data_manifest),
            ("navigation_paths", &self.navigation_paths),
        ];
        for (field, paths) in path_lists {
            if let Some(bad) = paths.iter().find(|p| !p.starts_with('/')) {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: format!("path {bad:?} must start with '/'"),
                });
            }
        }

        for (field, prefixes) in [("data_prefixes", &self.data_prefixes), ("asset_prefixes", &self.asset_prefixes)] {
            if let Some(bad) = prefixes.iter().find(|p| !p.starts_with('/') || !p.ends_with('/')) {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: format!("prefix {bad:?} must start and end with '/'"),
                });
            }
        }

        if !self.shell_manifest.contains(&self.offline_document_path) {
            return Err(ConfigError::Invalid {
                field: "offline_document_path".into(),
                reason: "must appear in shell_manifest so it is precached".into(),
            });
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

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        Ok(())
    }
}
