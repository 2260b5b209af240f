//! Configuration management for the CLI

use anyhow::{Context, Result};
use evaluator_lib::quota::{DEFAULT_CPU_FLOOR, DEFAULT_MEMORY_FLOOR_MB};
use evaluator_lib::QuotaPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Snapshot endpoint used when neither `--snapshot` nor `--url` is given
    #[serde(default)]
    pub snapshot_url: Option<String>,

    /// Minimum CPU limit under a quota (cores)
    #[serde(default = "default_cpu_floor")]
    pub cpu_floor: f64,

    /// Minimum memory limit under a quota (MB)
    #[serde(default = "default_memory_floor_mb")]
    pub memory_floor_mb: u64,
}

fn default_cpu_floor() -> f64 {
    DEFAULT_CPU_FLOOR
}

fn default_memory_floor_mb() -> u64 {
    DEFAULT_MEMORY_FLOOR_MB
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_url: None,
            cpu_floor: default_cpu_floor(),
            memory_floor_mb: default_memory_floor_mb(),
        }
    }
}

impl Config {
    /// Load configuration from the config file and `KRES_*` environment
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::load_layers(None),
        }
    }

    /// Load with an explicit config file; a missing file is not an error
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_layers(Some(path))
    }

    fn load_layers(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let config = builder
            .add_source(config::Environment::with_prefix("KRES"))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Quota floors for the evaluator
    pub fn quota_policy(&self) -> QuotaPolicy {
        QuotaPolicy {
            cpu_floor: self.cpu_floor,
            memory_floor_mb: self.memory_floor_mb,
        }
    }

    /// Get the configuration file path
    fn config_path() -> Option<PathBuf> {
        let home = dirs_next::home_dir()?;
        Some(home.join(".config").join("kres").join("config.toml"))
    }
}
