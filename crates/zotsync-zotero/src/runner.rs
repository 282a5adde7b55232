//! Main runner for the Zotero sync

use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use zotsync_core::ProgressContext;

use crate::api::{Endpoints, ItemSource, REJECTED_QUERY, ZoteroClient, error_hint};
use crate::config::Config;
use crate::entry::parse_atom_entry;
use crate::error::SyncError;
use crate::journal::{CommitJournal, Recovery};
use crate::keys::{KeyStore, missing_keys, parse_key_list};
use crate::record::{ExtractError, ItemRecord};
use crate::status::{LastUpdate, ProgressFile};

/// Sync execution summary
#[derive(Debug)]
pub struct Summary {
    pub server_keys: usize,
    pub local_keys: usize,
    pub missing: usize,
    /// Items committed to the record file and key store
    pub parsed: usize,
    /// Items skipped because their entry could not be extracted
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Run one sync against the Zotero Web API
pub fn run(config: &Config, progress: &ProgressContext) -> Result<Summary, SyncError> {
    let client = ZoteroClient::new(config);
    let summary = Syncer::new(&client, config).with_progress(progress).run()?;

    log::info!("=== Zotero Sync Summary ===");
    log::info!(
        "Keys: {} on server, {} local, {} missing",
        summary.server_keys,
        summary.local_keys,
        summary.missing
    );
    log::info!("Items: {} saved ({} skipped)", summary.parsed, summary.skipped);
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok(summary)
}

/// One sync pass over an [`ItemSource`]
pub struct Syncer<'a, S: ItemSource> {
    source: &'a S,
    item_base: String,
    abort_on_rejected_query: bool,
    keys: KeyStore,
    journal: CommitJournal,
    progress: ProgressFile,
    last_update: LastUpdate,
    bar: ProgressBar,
    console: Option<&'a ProgressContext>,
}

impl<'a, S: ItemSource> Syncer<'a, S> {
    pub fn new(source: &'a S, config: &Config) -> Self {
        let paths = &config.paths;
        Self {
            source,
            item_base: Endpoints::new(config).item_base(),
            abort_on_rejected_query: config.abort_on_rejected_query,
            keys: KeyStore::new(&paths.key_store),
            journal: CommitJournal::new(paths),
            progress: ProgressFile::new(&paths.progress),
            last_update: LastUpdate::new(&paths.last_update),
            bar: ProgressBar::hidden(),
            console: None,
        }
    }

    /// Draw the item bar and print skip notices through `progress`.
    pub fn with_progress(mut self, progress: &'a ProgressContext) -> Self {
        self.bar = progress.item_bar("zotero");
        self.console = Some(progress);
        self
    }

    pub fn run(&self) -> Result<Summary, SyncError> {
        let start = Instant::now();

        self.progress
            .running(0, 0)
            .map_err(SyncError::io("progress file"))?;

        match self.journal.recover() {
            Ok(Recovery::Clean) => {}
            Ok(recovery) => log::debug!("Commit journal: {recovery:?}"),
            Err(e) => return Err(self.abort(SyncError::io("commit journal")(e))),
        }

        // Key lists
        let server_body = self
            .source
            .list_keys()
            .map_err(|e| self.abort(SyncError::KeyList(e)))?;

        if server_body.trim() == REJECTED_QUERY {
            let err = SyncError::RejectedQuery;
            if self.abort_on_rejected_query {
                return Err(self.abort(err));
            }
            // Not fatal: the body is split as a key list below
            log::error!("{err}");
            self.progress.fail(&err.to_string());
        }

        let server_keys = parse_key_list(&server_body);
        log::info!("SERVER KEY LIST ITEM COUNT: {}", server_keys.len());

        let local_keys = self
            .keys
            .load()
            .map_err(|e| self.abort(SyncError::io("key store")(e)))?;
        log::info!("LOCAL FILE ITEM COUNT: {}", local_keys.len());

        // Delta
        let missing = missing_keys(&server_keys, &local_keys);
        let total = missing.len();
        self.progress
            .running(0, total)
            .map_err(|e| self.abort(SyncError::io("progress file")(e)))?;
        log::info!("count of missing items: {total}");
        self.bar.set_length(total as u64);

        // Fetch
        let mut parsed = 0;
        let mut skipped = 0;
        for (i, key) in missing.iter().enumerate() {
            let index = i + 1;
            log::info!("{index}/{total}");
            log::info!("{key}");
            self.progress
                .running(index, total)
                .map_err(|e| self.abort(SyncError::io("progress file")(e)))?;
            self.bar.set_position(index as u64);
            self.bar.set_message(key.clone());

            let body = self.source.fetch_item(key).map_err(|source| {
                self.abort(SyncError::Item {
                    index,
                    key: key.clone(),
                    source,
                })
            })?;

            let record = match self.extract(&body, key) {
                Ok(record) => record,
                Err(e) => {
                    self.report_skip(key, &e);
                    skipped += 1;
                    continue;
                }
            };
            log::info!("{}", record.item_type);
            log::info!("{}", record.title);
            log::info!("{}", record.creator_summary);

            self.journal
                .commit(key, &record.to_line(), index == total)
                .map_err(|e| self.abort(SyncError::io("record files")(e)))?;
            parsed += 1;
        }

        self.progress
            .done(parsed)
            .map_err(|e| self.abort(SyncError::io("progress file")(e)))?;
        self.last_update
            .touch()
            .map_err(|e| self.abort(SyncError::io("last update file")(e)))?;
        self.bar.finish_and_clear();

        Ok(Summary {
            server_keys: server_keys.len(),
            local_keys: local_keys.len(),
            missing: total,
            parsed,
            skipped,
            elapsed: start.elapsed(),
        })
    }

    fn extract(&self, body: &str, key: &str) -> Result<ItemRecord, ExtractError> {
        let entry = parse_atom_entry(body)
            .map_err(|e| ExtractError::Malformed(e.to_string()))?
            .ok_or(ExtractError::NoEntry)?;
        ItemRecord::from_entry(&entry, key, &self.item_base)
    }

    /// Skipped items always reach stdout; on a terminal the log goes to stderr.
    fn report_skip(&self, key: &str, err: &ExtractError) {
        let line = skip_line(key, err);
        match self.console {
            Some(console) if console.is_tty() => console.println(line),
            _ => log::error!("{line}"),
        }
    }

    #[cfg(test)]
    fn progress_history(&self) -> Vec<String> {
        self.progress.history()
    }

    /// Log, explain, and publish a fatal error.
    fn abort(&self, err: SyncError) -> SyncError {
        log::error!("{err}");
        if let Some(hint) = err.fetch_error().and_then(error_hint) {
            log::warn!("{hint}");
        }
        self.progress.fail(&err.to_string());
        self.bar.abandon();
        err
    }
}

fn skip_line(key: &str, err: &ExtractError) -> String {
    format!("ERROR: {err} ({key})")
}
