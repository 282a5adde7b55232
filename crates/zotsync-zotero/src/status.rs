//! Progress file polled by the external caller, and the last-update stamp

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use zotsync_core::{read_optional, write_atomic};

/// Marker written in place of the processed count on completion
pub const DONE_MARKER: &str = "Done";

/// Parsed progress file content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressState {
    /// `<done>/<total>`
    Running { done: usize, total: usize },
    /// `Done/<parsed>`
    Done { parsed: usize },
    /// Any other content: the error of a failed run
    Failed(String),
}

impl ProgressState {
    pub fn parse(content: &str) -> Self {
        let content = content.trim();
        if let Some((left, right)) = content.split_once('/') {
            if let Ok(count) = right.parse::<usize>() {
                if left == DONE_MARKER {
                    return Self::Done { parsed: count };
                }
                if let Ok(done) = left.parse::<usize>() {
                    return Self::Running { done, total: count };
                }
            }
        }
        Self::Failed(content.to_string())
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl std::fmt::Display for ProgressState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running { done, total } => write!(f, "{done}/{total}"),
            Self::Done { parsed } => write!(f, "{DONE_MARKER}/{parsed}"),
            Self::Failed(message) => f.write_str(message),
        }
    }
}

/// Overwrite-only progress file
#[derive(Debug, Clone)]
pub struct ProgressFile {
    path: PathBuf,
    /// Every state written, oldest first
    #[cfg(test)]
    history: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
}

impl ProgressFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            #[cfg(test)]
            history: Default::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, state: &ProgressState) -> io::Result<()> {
        let text = state.to_string();
        write_atomic(&self.path, &text)?;
        #[cfg(test)]
        self.history.borrow_mut().push(text);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    pub fn running(&self, done: usize, total: usize) -> io::Result<()> {
        self.write(&ProgressState::Running { done, total })
    }

    pub fn done(&self, parsed: usize) -> io::Result<()> {
        self.write(&ProgressState::Done { parsed })
    }

    /// Record a fatal error. A failure to write is logged, not raised:
    /// the run is already failing with the original error.
    pub fn fail(&self, message: &str) {
        if let Err(e) = self.write(&ProgressState::Failed(message.to_string())) {
            log::error!("Failed to write {}: {e}", self.path.display());
        }
    }

    /// Current state, `None` if no run has written the file yet
    pub fn read(&self) -> io::Result<Option<ProgressState>> {
        Ok(read_optional(&self.path)?.map(|s| ProgressState::parse(&s)))
    }
}

/// Epoch-seconds stamp of the last complete run
#[derive(Debug, Clone)]
pub struct LastUpdate {
    path: PathBuf,
}

impl LastUpdate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn write(&self, at: DateTime<Utc>) -> io::Result<()> {
        write_atomic(&self.path, &at.timestamp().to_string())
    }

    pub fn touch(&self) -> io::Result<()> {
        self.write(Utc::now())
    }

    /// `None` when the file is missing or unparseable
    pub fn read(&self) -> io::Result<Option<DateTime<Utc>>> {
        Ok(read_optional(&self.path)?
            .and_then(|s| s.trim().parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_running() {
        assert_eq!(
            ProgressState::parse("3/10"),
            ProgressState::Running { done: 3, total: 10 }
        );
        assert_eq!(
            ProgressState::parse("0/0\n"),
            ProgressState::Running { done: 0, total: 0 }
        );
    }

    #[test]
    fn parse_done() {
        assert_eq!(
            ProgressState::parse("Done/7"),
            ProgressState::Done { parsed: 7 }
        );
    }

    #[test]
    fn parse_error_text() {
        let msg = "ERROR: Error loading list of keys on server: 403 Forbidden";
        let state = ProgressState::parse(msg);
        assert!(state.is_failed());
        assert_eq!(state.to_string(), msg);
    }

    #[test]
    fn parse_slash_in_error_is_failed() {
        assert!(ProgressState::parse("Error loading data/items").is_failed());
        assert!(ProgressState::parse("Done/x").is_failed());
    }

    #[test]
    fn display_matches_file_format() {
        assert_eq!(ProgressState::Running { done: 1, total: 2 }.to_string(), "1/2");
        assert_eq!(ProgressState::Done { parsed: 2 }.to_string(), "Done/2");
    }

    #[test]
    fn progress_file_overwrites() {
        let dir = TempDir::new().unwrap();
        let file = ProgressFile::new(dir.path().join("progress.txt"));
        assert_eq!(file.read().unwrap(), None);

        file.running(0, 0).unwrap();
        file.running(1, 4).unwrap();
        assert_eq!(
            std::fs::read_to_string(file.path()).unwrap(),
            "1/4"
        );

        file.fail("boom");
        assert_eq!(
            file.read().unwrap(),
            Some(ProgressState::Failed("boom".into()))
        );
        assert_eq!(file.history(), vec!["0/0", "1/4", "boom"]);
    }

    #[test]
    fn last_update_roundtrip() {
        let dir = TempDir::new().unwrap();
        let stamp = LastUpdate::new(dir.path().join("lastupdate.txt"));
        assert_eq!(stamp.read().unwrap(), None);

        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        stamp.write(at).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("lastupdate.txt")).unwrap(),
            "1700000000"
        );
        assert_eq!(stamp.read().unwrap(), Some(at));
    }
}
