//! Journaled commit of one item into the record file and the key store.
//!
//! The two appends are preceded by a staged journal (`<key_store>.pending`)
//! so a crash between them is completed on the next run instead of leaving a
//! key without its record or a record without its key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use zotsync_core::{append_line, read_optional, write_atomic};

use crate::config::SyncPaths;
use crate::keys::KeyStore;
use crate::record::RECORD_FIELDS;

/// What [`CommitJournal::recover`] found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// No journal on disk
    Clean,
    /// Journal key was already stored; journal removed
    AlreadyCommitted(String),
    /// Missing appends were replayed for this key
    Completed(String),
    /// Journal could not be read as key + record; removed
    Discarded,
}

#[derive(Debug, Clone)]
pub struct CommitJournal {
    journal: PathBuf,
    records: PathBuf,
    keys: KeyStore,
}

impl CommitJournal {
    pub fn new(paths: &SyncPaths) -> Self {
        Self {
            journal: paths.journal(),
            records: paths.records.clone(),
            keys: KeyStore::new(&paths.key_store),
        }
    }

    pub fn path(&self) -> &Path {
        &self.journal
    }

    /// Commit one item. `last` leaves both lines unterminated.
    pub fn commit(&self, key: &str, record_line: &str, last: bool) -> io::Result<()> {
        write_atomic(&self.journal, &format!("{key}\n{record_line}"))?;
        append_line(&self.records, record_line, !last)?;
        append_line(self.keys.path(), key, !last)?;
        fs::remove_file(&self.journal)
    }

    /// Finish or discard a commit interrupted by a previous run.
    pub fn recover(&self) -> io::Result<Recovery> {
        let Some(staged) = read_optional(&self.journal)? else {
            return Ok(Recovery::Clean);
        };

        let Some((key, record_line)) = parse_staged(&staged) else {
            log::warn!(
                "Discarding unreadable commit journal {}",
                self.journal.display()
            );
            fs::remove_file(&self.journal)?;
            return Ok(Recovery::Discarded);
        };
        let key = key.to_string();

        if self.keys.load()?.contains(&key) {
            fs::remove_file(&self.journal)?;
            return Ok(Recovery::AlreadyCommitted(key));
        }

        if !self.records_end_with(record_line)? {
            append_line(&self.records, record_line, true)?;
        }
        append_line(self.keys.path(), &key, true)?;
        fs::remove_file(&self.journal)?;

        log::info!("Recovered interrupted commit for item {key}");
        Ok(Recovery::Completed(key))
    }

    fn records_end_with(&self, record_line: &str) -> io::Result<bool> {
        Ok(read_optional(&self.records)?
            .and_then(|s| s.lines().last().map(|last| last == record_line))
            .unwrap_or(false))
    }
}

/// Split a journal into key and record line.
///
/// The record must be a full record line for that same key.
fn parse_staged(staged: &str) -> Option<(&str, &str)> {
    let (key, record_line) = staged.split_once('\n')?;
    let key = key.trim();
    let fields: Vec<&str> = record_line.split('\t').collect();
    (!key.is_empty() && fields.len() == RECORD_FIELDS && fields[1] == key)
        .then_some((key, record_line))
}
