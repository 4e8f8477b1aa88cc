//! Coordinator configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (OFFRAMP_*)
//! 2. TOML config file (if OFFRAMP_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::routes::{PartitionKind, normalize_manifest_path};

mod validation;

pub use validation::ConfigError;

/// Immutable coordinator configuration.
///
/// The version tag is the only cache-busting mechanism: bumping it renames
/// every partition, and the next activation garbage-collects the
/// predecessors.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (OFFRAMP_*)
/// 2. TOML config file (if OFFRAMP_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Deployment version tag embedded in every partition name.
    #[serde(default = "default_version_tag")]
    pub version_tag: String,

    /// Origin base URL the site is served from. Sub-path hosting is
    /// supported; the path component must end with '/'.
    #[serde(default = "default_origin_url")]
    pub origin_url: Url,

    /// Address the hosting proxy listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Path to the SQLite partition store.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for origin requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Origin request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Precache manifest for the shell partition. Also the exact-match set
    /// for cache-first shell routing.
    #[serde(default = "default_shell_manifest")]
    pub shell_manifest: Vec<String>,

    /// Precache manifest for the asset partition.
    #[serde(default = "default_asset_manifest")]
    pub asset_manifest: Vec<String>,

    /// Precache manifest for the data partition.
    #[serde(default = "default_data_manifest")]
    pub data_manifest: Vec<String>,

    /// Navigation paths whose documents may be written into the shell
    /// partition on successful page loads.
    #[serde(default = "default_navigation_paths")]
    pub navigation_paths: Vec<String>,

    /// Path prefixes routed to the data partition (stale-while-revalidate).
    #[serde(default = "default_data_prefixes")]
    pub data_prefixes: Vec<String>,

    /// Path prefixes routed to the asset partition (cache-first).
    #[serde(default = "default_asset_prefixes")]
    pub asset_prefixes: Vec<String>,

    /// Precached document served for uncached navigations while offline.
    /// Must appear in the shell manifest.
    #[serde(default = "default_offline_document_path")]
    pub offline_document_path: String,
}

fn default_version_tag() -> String {
    "v1".into()
}

fn default_origin_url() -> Url {
    // Url::parse of a constant literal cannot fail.
    Url::parse("http://127.0.0.1:8000/").expect("default origin url")
}

fn default_listen_addr() -> String {
    "127.0.0.1:8787".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./offramp-cache.sqlite")
}

fn default_user_agent() -> String {
    "offramp/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_shell_manifest() -> Vec<String> {
    ["/", "/index.html", "/offline.html", "/manifest.json"]
        .map(String::from)
        .to_vec()
}

fn default_asset_manifest() -> Vec<String> {
    [
        "/assets/css/theme.css",
        "/assets/css/main.css",
        "/assets/css/safety.css",
        "/assets/css/events.css",
        "/assets/js/onboarding.js",
        "/assets/js/safety.js",
        "/assets/js/events.js",
        "/assets/js/resources.js",
        "/assets/js/admin.js",
        "/assets/js/qr.js",
        "/assets/js/lib/i18n.js",
        "/assets/js/vendor/qr.min.js",
        "/assets/icons/icon-192.png",
        "/assets/icons/icon-512.png",
    ]
    .map(String::from)
    .to_vec()
}

fn default_data_manifest() -> Vec<String> {
    [
        "/assets/data/events.json",
        "/assets/data/resources.json",
        "/assets/data/onboarding.DEFAULT.json",
        "/assets/data/onboarding.KAL.json",
        "/assets/data/hotels.json",
        "/assets/data/housing.json",
        "/assets/i18n/en.json",
        "/assets/i18n/es.json",
        "/assets/i18n/pt.json",
        "/assets/i18n/translations.json",
    ]
    .map(String::from)
    .to_vec()
}

fn default_navigation_paths() -> Vec<String> {
    [
        "/index.html",
        "/pages/events.html",
        "/pages/resources.html",
        "/pages/hotel.html",
        "/pages/map.html",
        "/pages/dashboard.html",
        "/pages/admin.html",
        "/pages/qr.html",
        "/pages/feedback.html",
        "/pages/qr-sheet.html",
        "/pages/import-hotels.html",
    ]
    .map(String::from)
    .to_vec()
}

fn default_data_prefixes() -> Vec<String> {
    ["/assets/data/", "/assets/i18n/"].map(String::from).to_vec()
}

fn default_asset_prefixes() -> Vec<String> {
    ["/assets/css/", "/assets/js/", "/assets/icons/"].map(String::from).to_vec()
}

fn default_offline_document_path() -> String {
    "/offline.html".into()
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            version_tag: default_version_tag(),
            origin_url: default_origin_url(),
            listen_addr: default_listen_addr(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            shell_manifest: default_shell_manifest(),
            asset_manifest: default_asset_manifest(),
            data_manifest: default_data_manifest(),
            navigation_paths: default_navigation_paths(),
            data_prefixes: default_data_prefixes(),
            asset_prefixes: default_asset_prefixes(),
            offline_document_path: default_offline_document_path(),
        }
    }
}

impl CoordinatorConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Full partition name: fixed prefix + version tag, plain concatenation.
    pub fn partition_name(&self, kind: PartitionKind) -> String {
        format!("{}-{}", kind.prefix(), self.version_tag)
    }

    /// Partition names belonging to the current version. Everything else is
    /// swept at activation.
    pub fn allowed_partitions(&self) -> Vec<String> {
        [PartitionKind::Shell, PartitionKind::Asset, PartitionKind::Data]
            .into_iter()
            .map(|kind| self.partition_name(kind))
            .collect()
    }

    /// Resolve a site-relative path ("/assets/css/main.css") against the
    /// deployment base.
    pub fn resolve(&self, path: &str) -> Url {
        let base = self.origin_url.path().trim_end_matches('/');
        let mut url = self.origin_url.clone();
        url.set_path(&format!("{base}{path}"));
        url
    }

    /// Normalize an absolute URL back to a site-relative cache key.
    ///
    /// Returns None for cross-origin URLs or paths outside the deployment
    /// base; those never touch partitioned routes. The site root normalizes
    /// to the root document key, and the query string is dropped.
    pub fn normalize_path(&self, url: &Url) -> Option<String> {
        if url.origin() != self.origin_url.origin() {
            return None;
        }

        let base = self.origin_url.path().trim_end_matches('/');
        let rel = url.path().strip_prefix(base)?;
        if !rel.is_empty() && !rel.starts_with('/') {
            // "/sitemap" is not under the base "/site/".
            return None;
        }

        Some(normalize_manifest_path(rel))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `OFFRAMP_`
    /// 2. TOML file from `OFFRAMP_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OFFRAMP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OFFRAMP_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.version_tag, "v1");
        assert_eq!(config.db_path, PathBuf::from("./offramp-cache.sqlite"));
        assert_eq!(config.user_agent, "offramp/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert!(config.shell_manifest.contains(&"/offline.html".to_string()));
        assert!(config.data_prefixes.iter().all(|p| p.ends_with('/')));
    }

    #[test]
    fn test_timeout_duration() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_partition_names_embed_version() {
        let config = CoordinatorConfig { version_tag: "v7".into(), ..Default::default() };
        assert_eq!(config.partition_name(PartitionKind::Shell), "shell-v7");
        assert_eq!(config.partition_name(PartitionKind::Asset), "assets-v7");
        assert_eq!(config.partition_name(PartitionKind::Data), "data-v7");
        assert_eq!(config.allowed_partitions(), vec!["shell-v7", "assets-v7", "data-v7"]);
    }

    #[test]
    fn test_resolve_at_root() {
        let config = CoordinatorConfig::default();
        let url = config.resolve("/assets/css/main.css");
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/assets/css/main.css");
    }

    #[test]
    fn test_resolve_under_sub_path() {
        let config = CoordinatorConfig {
            origin_url: Url::parse("https://site.test/j1hub/").unwrap(),
            ..Default::default()
        };
        let url = config.resolve("/index.html");
        assert_eq!(url.as_str(), "https://site.test/j1hub/index.html");
    }

    #[test]
    fn test_normalize_root_to_document_key() {
        let config = CoordinatorConfig::default();
        let url = Url::parse("http://127.0.0.1:8000/").unwrap();
        assert_eq!(config.normalize_path(&url).as_deref(), Some("/index.html"));
    }

    #[test]
    fn test_normalize_drops_query() {
        let config = CoordinatorConfig::default();
        let url = Url::parse("http://127.0.0.1:8000/pages/events.html?tab=2").unwrap();
        assert_eq!(config.normalize_path(&url).as_deref(), Some("/pages/events.html"));
    }

    #[test]
    fn test_normalize_cross_origin() {
        let config = CoordinatorConfig::default();
        let url = Url::parse("https://cdn.example.com/lib.js").unwrap();
        assert_eq!(config.normalize_path(&url), None);
    }

    #[test]
    fn test_normalize_strips_sub_path_base() {
        let config = CoordinatorConfig {
            origin_url: Url::parse("https://site.test/j1hub/").unwrap(),
            ..Default::default()
        };

        let inside = Url::parse("https://site.test/j1hub/assets/data/events.json").unwrap();
        assert_eq!(config.normalize_path(&inside).as_deref(), Some("/assets/data/events.json"));

        let root = Url::parse("https://site.test/j1hub/").unwrap();
        assert_eq!(config.normalize_path(&root).as_deref(), Some("/index.html"));

        let outside = Url::parse("https://site.test/other/page.html").unwrap();
        assert_eq!(config.normalize_path(&outside), None);

        let sibling = Url::parse("https://site.test/j1hub-admin/").unwrap();
        assert_eq!(config.normalize_path(&sibling), None);
    }
}
