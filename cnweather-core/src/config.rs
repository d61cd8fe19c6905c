use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::provider::ProviderId;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Per-provider settings. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Only read for providers that need a key; the environment takes precedence.
    pub api_key: Option<String>,

    /// Endpoint override, mainly for pointing adapters at a local mock.
    pub base_url: Option<String>,

    /// Set to `true` to leave the provider out of the cascade.
    pub disabled: bool,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// timeout_secs = 8
/// data_dirs = ["/srv/cnweather"]
///
/// [providers.qweather]
/// api_key = "..."
///
/// [providers.nominatim]
/// disabled = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub timeout_secs: u64,

    /// Directories searched, in order, for the reference data files.
    pub data_dirs: Vec<PathBuf>,

    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self { timeout_secs: DEFAULT_TIMEOUT_SECS, data_dirs: Vec::new(), providers: HashMap::new() }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if cfg.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be positive in {}", path.display()));
        }

        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    pub fn is_provider_disabled(&self, id: ProviderId) -> bool {
        self.provider_config(id).is_some_and(|cfg| cfg.disabled)
    }

    pub fn provider_base_url(&self, id: ProviderId) -> Option<&str> {
        self.provider_config(id).and_then(|cfg| cfg.base_url.as_deref())
    }

    /// API key for a provider: its environment variable first, then the file.
    pub fn provider_api_key(&self, id: ProviderId) -> Option<String> {
        let from_env = id.api_key_env().and_then(|var| std::env::var(var).ok());
        self.api_key_with_env(id, from_env)
    }

    fn api_key_with_env(&self, id: ProviderId, from_env: Option<String>) -> Option<String> {
        from_env
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                self.provider_config(id)
                    .and_then(|cfg| cfg.api_key.clone())
                    .filter(|key| !key.trim().is_empty())
            })
            .map(|key| key.trim().to_string())
    }

    /// Candidate directories for reference data: configured ones, the working
    /// directory, then the platform data directory.
    pub fn data_search_paths(&self) -> Vec<PathBuf> {
        let mut paths = self.data_dirs.clone();
        paths.push(PathBuf::from("."));
        if let Ok(dirs) = project_dirs() {
            paths.push(dirs.data_dir().to_path_buf());
        }
        paths
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "cnweather", "cnweather")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
