//! Zotero sync configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Local files touched by a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPaths {
    /// Newline-delimited keys already synchronized
    pub key_store: PathBuf,
    /// Tab-delimited item records, one per line
    pub records: PathBuf,
    /// Polled status file (`n/m`, `Done/n`, or an error)
    pub progress: PathBuf,
    /// Epoch seconds of the last complete run
    pub last_update: PathBuf,
}

impl SyncPaths {
    /// Default file names placed under `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            key_store: dir.join("key.txt"),
            records: dir.join("new.txt"),
            progress: dir.join("progress.txt"),
            last_update: dir.join("lastupdate.txt"),
        }
    }

    /// Write-ahead journal for the in-flight commit
    pub fn journal(&self) -> PathBuf {
        let mut name = self
            .key_store
            .file_name()
            .unwrap_or_default()
            .to_os_string();
        name.push(".pending");
        self.key_store.with_file_name(name)
    }
}

impl Default for SyncPaths {
    fn default() -> Self {
        Self::in_dir(Path::new("."))
    }
}

/// Runtime configuration for one sync run
#[derive(Debug, Clone)]
pub struct Config {
    /// Zotero user id (numeric, as a string)
    pub user_id: String,
    /// Zotero API key
    pub api_key: String,
    /// Restrict the key list to one collection
    pub collection: Option<String>,
    /// API root, without trailing slash
    pub base_url: String,
    pub paths: SyncPaths,
    /// Per-request timeout
    pub read_timeout: Duration,
    /// Treat the "An error occurred" key-list body as fatal
    pub abort_on_rejected_query: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            api_key: String::new(),
            collection: None,
            base_url: "https://api.zotero.org".to_string(),
            paths: SyncPaths::default(),
            read_timeout: Duration::from_secs(60),
            abort_on_rejected_query: false,
        }
    }
}
