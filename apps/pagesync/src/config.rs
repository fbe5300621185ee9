//! Runner configuration.
//!
//! Read from the TOML file named by `PAGESYNC_CONFIG`, or `pagesync.toml`
//! in the working directory. Credentials never live in this file; they
//! come from the environment.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use pagesync_assets::{
    DEFAULT_CONCURRENCY, MAX_BATCH_BYTES, MAX_BATCH_FILES, MAX_FILE_BYTES, MAX_FILES, SyncLimits,
};
use pagesync_protocol::constants::DEFAULT_API_BASE_URL;

pub const CONFIG_ENV: &str = "PAGESYNC_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "pagesync.toml";

/// Runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Account owning the project.
    pub account_id: String,

    /// Pages project name.
    pub project: String,

    /// Directory holding the built site.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Gitignore-style globs, relative to `build_dir`, left out of the sync.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Overrides for the store limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_file_bytes: u64,
    pub max_files: usize,
    pub max_batch_bytes: u64,
    pub max_batch_files: usize,
    pub concurrency: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_FILE_BYTES,
            max_files: MAX_FILES,
            max_batch_bytes: MAX_BATCH_BYTES,
            max_batch_files: MAX_BATCH_FILES,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl From<&LimitsConfig> for SyncLimits {
    fn from(l: &LimitsConfig) -> Self {
        SyncLimits {
            max_file_bytes: l.max_file_bytes,
            max_files: l.max_files,
            max_batch_bytes: l.max_batch_bytes,
            max_batch_files: l.max_batch_files,
            concurrency: l.concurrency,
        }
    }
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.into()
}

impl Config {
    /// Loads the configuration file named by the environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    /// Loads and checks the configuration at `path`.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing configuration {}", path.display()))?;
        config.check()?;
        Ok(config)
    }

    /// Store limits as used by the sync.
    pub fn sync_limits(&self) -> SyncLimits {
        SyncLimits::from(&self.limits)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.account_id.trim().is_empty() {
            anyhow::bail!("account_id must not be empty");
        }
        if self.project.trim().is_empty() {
            anyhow::bail!("project must not be empty");
        }
        self.sync_limits().validate()?;
        Ok(())
    }
}

/// Returns the configuration file path.
fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
