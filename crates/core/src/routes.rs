//! Route classification: URL pattern -> (partition, strategy).
//!
//! Rules are evaluated in a fixed priority order; the first match wins.
//! Only same-origin requests ever reach the table (the coordinator gates
//! cross-origin traffic to pass-through before classifying).

use std::collections::HashSet;

use crate::config::CoordinatorConfig;
use crate::request::Destination;

/// Key a root navigation ("/") normalizes to.
pub const ROOT_DOCUMENT_KEY: &str = "/index.html";

/// The three logical cache partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    /// HTML/CSS/JS app framework, exact precache matches and navigations.
    Shell,
    /// Static media and scripts.
    Asset,
    /// JSON payloads.
    Data,
}

impl PartitionKind {
    /// Fixed name prefix; the full partition name appends the version tag.
    pub fn prefix(self) -> &'static str {
        match self {
            PartitionKind::Shell => "shell",
            PartitionKind::Asset => "assets",
            PartitionKind::Data => "data",
        }
    }
}

/// Fetch strategy applied to a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    StaleWhileRevalidate,
}

/// A URL-pattern predicate.
#[derive(Debug, Clone)]
enum Matcher {
    /// Exact normalized-path membership (the shell precache set).
    ExactSet(HashSet<String>),
    /// Any of the given path prefixes.
    PathPrefix(Vec<String>),
    /// Path suffix, e.g. ".json".
    PathSuffix(&'static str),
    /// Request destination classification.
    Destination(&'static [Destination]),
}

impl Matcher {
    fn matches(&self, path: &str, destination: Destination) -> bool {
        match self {
            Matcher::ExactSet(set) => set.contains(path),
            Matcher::PathPrefix(prefixes) => prefixes.iter().any(|p| path.starts_with(p.as_str())),
            Matcher::PathSuffix(suffix) => path.ends_with(suffix),
            Matcher::Destination(kinds) => kinds.contains(&destination),
        }
    }
}

#[derive(Debug, Clone)]
struct RouteRule {
    matcher: Matcher,
    partition: PartitionKind,
    strategy: Strategy,
}

/// The ordered strategy table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

const ASSET_DESTINATIONS: &[Destination] =
    &[Destination::Style, Destination::Script, Destination::Image, Destination::Font];

impl RouteTable {
    /// Build the table from configuration, in priority order:
    ///
    /// 1. shell exact matches -> cache-first, shell partition
    /// 2. data directory prefixes -> stale-while-revalidate, data partition
    /// 3. `.json` suffix -> stale-while-revalidate, data partition
    /// 4. asset directory prefixes -> cache-first, asset partition
    /// 5. style/script/image/font destinations -> cache-first, asset partition
    pub fn from_config(config: &CoordinatorConfig) -> Self {
        let shell: HashSet<String> = config
            .shell_manifest
            .iter()
            .map(|p| normalize_manifest_path(p))
            .collect();

        let rules = vec![
            RouteRule {
                matcher: Matcher::ExactSet(shell),
                partition: PartitionKind::Shell,
                strategy: Strategy::CacheFirst,
            },
            RouteRule {
                matcher: Matcher::PathPrefix(config.data_prefixes.clone()),
                partition: PartitionKind::Data,
                strategy: Strategy::StaleWhileRevalidate,
            },
            RouteRule {
                matcher: Matcher::PathSuffix(".json"),
                partition: PartitionKind::Data,
                strategy: Strategy::StaleWhileRevalidate,
            },
            RouteRule {
                matcher: Matcher::PathPrefix(config.asset_prefixes.clone()),
                partition: PartitionKind::Asset,
                strategy: Strategy::CacheFirst,
            },
            RouteRule {
                matcher: Matcher::Destination(ASSET_DESTINATIONS),
                partition: PartitionKind::Asset,
                strategy: Strategy::CacheFirst,
            },
        ];

        Self { rules }
    }

    /// Classify a normalized same-origin path. None means pass-through.
    pub fn classify(&self, path: &str, destination: Destination) -> Option<(PartitionKind, Strategy)> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(path, destination))
            .map(|rule| (rule.partition, rule.strategy))
    }
}

/// Manifest entries and cache keys share one normal form: the site root
/// aliases to the root document key, everything else keys by literal path.
pub fn normalize_manifest_path(path: &str) -> String {
    if path == "/" || path.is_empty() {
        ROOT_DOCUMENT_KEY.to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoordinatorConfig;

    fn table() -> RouteTable {
        RouteTable::from_config(&CoordinatorConfig::default())
    }

    #[test]
    fn test_shell_exact_match_wins() {
        let (partition, strategy) = table().classify("/index.html", Destination::Document).unwrap();
        assert_eq!(partition, PartitionKind::Shell);
        assert_eq!(strategy, Strategy::CacheFirst);
    }

    #[test]
    fn test_root_normalizes_into_shell_set() {
        // "/" appears in the default shell manifest; the set holds its
        // normalized form.
        let (partition, _) = table().classify(ROOT_DOCUMENT_KEY, Destination::Document).unwrap();
        assert_eq!(partition, PartitionKind::Shell);
    }

    #[test]
    fn test_data_prefix_beats_json_suffix() {
        let (partition, strategy) = table().classify("/assets/data/events.json", Destination::Other).unwrap();
        assert_eq!(partition, PartitionKind::Data);
        assert_eq!(strategy, Strategy::StaleWhileRevalidate);
    }

    #[test]
    fn test_json_suffix_outside_data_dirs() {
        let (partition, strategy) = table().classify("/exports/report.json", Destination::Other).unwrap();
        assert_eq!(partition, PartitionKind::Data);
        assert_eq!(strategy, Strategy::StaleWhileRevalidate);
    }

    #[test]
    fn test_asset_prefix() {
        let (partition, strategy) = table().classify("/assets/css/main.css", Destination::Other).unwrap();
        assert_eq!(partition, PartitionKind::Asset);
        assert_eq!(strategy, Strategy::CacheFirst);
    }

    #[test]
    fn test_destination_catches_stray_assets() {
        // A script loaded from outside the asset directories still routes to
        // the asset partition by destination.
        let (partition, _) = table().classify("/vendor/qr.min.js", Destination::Script).unwrap();
        assert_eq!(partition, PartitionKind::Asset);
    }

    #[test]
    fn test_unmatched_is_pass_through() {
        assert!(table().classify("/api/submit", Destination::Other).is_none());
        assert!(table().classify("/pages/events.html", Destination::Other).is_none());
    }

    #[test]
    fn test_manifest_json_is_shell_not_data() {
        // Priority order: the exact shell match must beat the .json suffix.
        let (partition, _) = table().classify("/manifest.json", Destination::Other).unwrap();
        assert_eq!(partition, PartitionKind::Shell);
    }

    #[test]
    fn test_normalize_manifest_path() {
        assert_eq!(normalize_manifest_path("/"), ROOT_DOCUMENT_KEY);
        assert_eq!(normalize_manifest_path(""), ROOT_DOCUMENT_KEY);
        assert_eq!(normalize_manifest_path("/offline.html"), "/offline.html");
    }
}
