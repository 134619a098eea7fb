//! Configuration handling for vfsearch.
//!
//! Configuration is loaded from a TOML file under the XDG config
//! directory. Every section is optional; a missing file yields the
//! built-in defaults.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vfsearch_core::SourceScope;
use vfsearch_index::{SchedulerConfig, TypeRegistry};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Source scopes to index
    #[serde(default)]
    pub scopes: Vec<SourceScope>,

    /// Scheduler tuning
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Index configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Index-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index directory (default: XDG data dir)
    pub data_dir: Option<PathBuf>,

    /// Legacy content type ids handled by the legacy factory
    #[serde(default = "default_legacy_types")]
    pub legacy_content_types: Vec<u32>,

    /// Chain locale variants of the same item
    #[serde(default = "default_chain_variants")]
    pub chain_locale_variants: bool,

    /// Raw-to-canonical resource type mappings
    #[serde(default)]
    pub type_aliases: Vec<TypeAlias>,
}

/// One raw-to-canonical resource type mapping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TypeAlias {
    pub raw: u32,
    pub canonical: u32,
}

fn default_legacy_types() -> Vec<u32> {
    vec![]
}

fn default_chain_variants() -> bool {
    true
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            legacy_content_types: default_legacy_types(),
            chain_locale_variants: default_chain_variants(),
            type_aliases: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults when no file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from `path`, or the default location when none
    /// is given.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        let path = match path.or_else(Self::config_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Default config file path.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("VFSEARCH_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.toml"));
        }
        ProjectDirs::from("", "", "vfsearch").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the type registry from the configured aliases.
    pub fn type_registry(&self) -> TypeRegistry {
        let mut types = TypeRegistry::new();
        for alias in &self.index.type_aliases {
            types.map(alias.raw, alias.canonical);
        }
        types
    }

    /// Resolved index directory.
    pub fn index_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.index.data_dir {
            return Ok(dir.clone());
        }
        data_dir()
            .map(|d| d.join("index"))
            .context("could not determine data directory")
    }

    /// Sample configuration file contents.
    pub fn sample_toml() -> &'static str {
        r#"# vfsearch configuration

[[scopes]]
name = "site"
roots = ["/srv/content/site"]
# resource_types = [1, 2]
# mime_types = ["text/plain", "text/html"]

[scheduler]
timeout = 20
commit_threshold = 500
cancellation = "cooperative"

[index]
# data_dir = "/var/lib/vfsearch/index"
legacy_content_types = []
chain_locale_variants = true
# type_aliases = [{ raw = 17, canonical = 1 }]

[logging]
level = "info"
"#
    }
}

/// Data directory for the index.
pub fn data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("VFSEARCH_DATA_DIR") {
        return Some(PathBuf::from(dir));
    }
    ProjectDirs::from("", "", "vfsearch").map(|dirs| dirs.data_dir().to_path_buf())
}
