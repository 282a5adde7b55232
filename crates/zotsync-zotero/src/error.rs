//! Fatal errors that end a sync run

use zotsync_core::FetchError;

/// Error that aborts a sync run.
///
/// `Display` is the exact text written to the progress file.
#[derive(Debug)]
pub enum SyncError {
    /// Key list request failed
    KeyList(FetchError),
    /// Key list body was the service's rejected-query sentinel
    RejectedQuery,
    /// Item request failed; `index` is 1-based within the missing set
    Item {
        index: usize,
        key: String,
        source: FetchError,
    },
    /// Local file could not be read or written
    Io {
        what: &'static str,
        source: std::io::Error,
    },
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyList(e) => write!(f, "ERROR: Error loading list of keys on server: {e}"),
            Self::RejectedQuery => write!(
                f,
                "ERROR: Zotero returned an error. Did you enter the correct key, user id, and collection id?"
            ),
            Self::Item { index, key, source } => write!(
                f,
                "Error loading data from item number {index} ({key}) on server: {source}"
            ),
            Self::Io { what, source } => write!(f, "ERROR: Could not access {what}: {source}"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::KeyList(e) | Self::Item { source: e, .. } => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::RejectedQuery => None,
        }
    }
}

impl SyncError {
    pub fn io(what: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::Io { what, source }
    }

    /// Underlying HTTP failure, if any
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            Self::KeyList(e) | Self::Item { source: e, .. } => Some(e),
            _ => None,
        }
    }
}
