//! Local key store and the server/local delta

use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use zotsync_core::read_optional;

/// Split a newline-delimited key list, dropping blank lines.
pub fn parse_key_list(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Server keys not present locally, in server order, each at most once.
pub fn missing_keys(server: &[String], local: &FxHashSet<String>) -> Vec<String> {
    let mut seen = FxHashSet::default();
    server
        .iter()
        .filter(|k| !local.contains(k.as_str()) && seen.insert(k.as_str()))
        .cloned()
        .collect()
}

/// Newline-delimited file of keys already synchronized
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored keys in file order. A missing file is an empty store.
    pub fn read(&self) -> io::Result<Vec<String>> {
        Ok(read_optional(&self.path)?
            .map(|s| parse_key_list(&s))
            .unwrap_or_default())
    }

    /// Stored keys as a lookup set
    pub fn load(&self) -> io::Result<FxHashSet<String>> {
        Ok(self.read()?.into_iter().collect())
    }
}
