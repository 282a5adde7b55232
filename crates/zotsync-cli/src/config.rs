//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for zotsync
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub zotero: ZoteroConfig,
    pub files: FilesConfig,
    pub http: HttpConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZoteroConfig {
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub api_key: Option<String>,
    pub collection: Option<String>,
    pub base_url: String,
}

impl Default for ZoteroConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            api_key: std::env::var("ZOTERO_API_KEY").ok(),
            collection: None,
            base_url: "https://api.zotero.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub key_store: PathBuf,
    pub records: PathBuf,
    pub progress: PathBuf,
    pub last_update: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            key_store: PathBuf::from("key.txt"),
            records: PathBuf::from("new.txt"),
            progress: PathBuf::from("progress.txt"),
            last_update: PathBuf::from("lastupdate.txt"),
        }
    }
}

impl FilesConfig {
    /// Resolve relative paths against `dir` (absolute paths are kept)
    pub fn resolve(&self, dir: &Path) -> zotsync_zotero::SyncPaths {
        zotsync_zotero::SyncPaths {
            key_store: dir.join(&self.key_store),
            records: dir.join(&self.records),
            progress: dir.join(&self.progress),
            last_update: dir.join(&self.last_update),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub read_timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { read_timeout: 60 }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct SyncConfig {
    pub abort_on_rejected_query: bool,
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./zotsync.toml (current directory)
    /// 2. ~/.config/zotsync/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("zotsync.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "zotsync") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
