//! Configuration loading for the `sightline` binary.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag; the file must exist)
//! 2. `~/.sightline/config.toml` (user)
//! 3. `/etc/sightline/config.toml` (system)
//!
//! When no file is found the built-in defaults apply.
//!
//! ```toml
//! [cache]
//! max_entries = 1024
//! ttl_secs = 1800
//!
//! [walk]
//! topo_sort = false
//!
//! [tiers]
//! heads = ["refs/heads/"]
//! tags = ["refs/tags/"]
//! excluded = ["refs/changes/"]
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::reachability::tier::{CHANGES_PREFIX, HEADS_PREFIX, TAGS_PREFIX};
use crate::{CacheConfig, Result, SightlineError, TierPolicy, VisibilityCache, VisibilityChecker};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub walk: WalkSection,
    #[serde(default)]
    pub tiers: TiersSection,
}

/// Decision cache limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheSection {
    /// Maximum cached verdicts (default: 1024).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    /// Verdict time-to-live in seconds (default: 1800).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_max_entries() -> u64 {
    CacheConfig::default().max_entries
}

fn default_ttl_secs() -> u64 {
    CacheConfig::default().ttl.as_secs()
}

/// Ancestor walk tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WalkSection {
    /// Use the topological walk order (default: false).
    #[serde(default)]
    pub topo_sort: bool,
}

/// Ref name prefixes for the boundary tiers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TiersSection {
    /// First tier: frequently updated pointers.
    #[serde(default = "default_heads")]
    pub heads: Vec<String>,
    /// Second tier: rarely updated pointers.
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    /// Namespaces never used as boundaries.
    #[serde(default = "default_excluded")]
    pub excluded: Vec<String>,
}

impl Default for TiersSection {
    fn default() -> Self {
        Self {
            heads: default_heads(),
            tags: default_tags(),
            excluded: default_excluded(),
        }
    }
}

fn default_heads() -> Vec<String> {
    vec![HEADS_PREFIX.to_string()]
}

fn default_tags() -> Vec<String> {
    vec![TAGS_PREFIX.to_string()]
}

fn default_excluded() -> Vec<String> {
    vec![CHANGES_PREFIX.to_string()]
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.sightline/config.toml`
    /// 3. `/etc/sightline/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a specific configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SightlineError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            SightlineError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, if any.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(SightlineError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".sightline").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/sightline/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Cache limits from the `[cache]` section.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .max_entries(self.cache.max_entries)
            .ttl(Duration::from_secs(self.cache.ttl_secs))
    }

    /// Tier policy from the `[tiers]` section.
    pub fn tier_policy(&self) -> TierPolicy {
        TierPolicy::from_prefixes(
            self.tiers.heads.iter().cloned(),
            self.tiers.tags.iter().cloned(),
            self.tiers.excluded.iter().cloned(),
        )
    }

    /// Checker built from the `[walk]` and `[tiers]` sections.
    pub fn checker(&self) -> VisibilityChecker {
        VisibilityChecker::with_policy(self.walk.topo_sort, self.tier_policy())
    }

    /// Decision cache built from the whole file.
    pub fn build_cache(&self) -> VisibilityCache {
        VisibilityCache::with_checker(self.checker(), &self.cache_config())
    }
}
