//! Sync subcommand - download metadata for items missing locally

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use clap::Args;

use zotsync_core::SharedProgress;

use crate::config::Config;

#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Zotero user id (overrides config)
    #[arg(long)]
    pub user_id: Option<String>,

    /// Zotero API key (overrides config and ZOTERO_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Only sync items of this collection
    #[arg(long)]
    pub collection: Option<String>,

    /// Directory relative file paths are resolved against
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Stop when Zotero rejects the key list query
    #[arg(long)]
    pub strict: bool,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub read_timeout: Option<u64>,
}

/// Merge config file and CLI overrides into the sync configuration
pub fn build_config(args: &SyncArgs, config: &Config) -> Result<zotsync_zotero::Config> {
    let user_id = args
        .user_id
        .clone()
        .unwrap_or_else(|| config.zotero.user_id.clone());
    let api_key = args
        .api_key
        .clone()
        .or_else(|| config.zotero.api_key.clone())
        .unwrap_or_default();

    ensure!(
        !user_id.trim().is_empty(),
        "Zotero user id is not set (use --user-id or [zotero] user_id)"
    );
    ensure!(
        !api_key.trim().is_empty(),
        "Zotero API key is not set (use --api-key, ZOTERO_API_KEY or [zotero] api_key)"
    );

    Ok(zotsync_zotero::Config {
        user_id,
        api_key,
        collection: args
            .collection
            .clone()
            .or_else(|| config.zotero.collection.clone())
            .filter(|c| !c.trim().is_empty()),
        base_url: config.zotero.base_url.clone(),
        paths: config.files.resolve(&args.dir),
        read_timeout: Duration::from_secs(args.read_timeout.unwrap_or(config.http.read_timeout)),
        abort_on_rejected_query: args.strict || config.sync.abort_on_rejected_query,
    })
}

pub fn run(args: SyncArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let sync_config = build_config(&args, config)?;
    log::debug!(
        "Syncing user {} into {}",
        sync_config.user_id,
        args.dir.display()
    );

    let summary = zotsync_zotero::run(&sync_config, progress).context("Zotero sync failed")?;

    progress.println(format!(
        "Synced {} of {} missing items ({} skipped)",
        summary.parsed, summary.missing, summary.skipped
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_config() -> Config {
        let mut config = Config::default();
        config.zotero.user_id = "111".into();
        config.zotero.api_key = Some("FILEKEY".into());
        config
    }

    #[test]
    fn cli_overrides_file() {
        let args = SyncArgs {
            user_id: Some("222".into()),
            api_key: Some("CLIKEY".into()),
            collection: Some("COLL".into()),
            dir: PathBuf::from("/data"),
            strict: true,
            read_timeout: Some(5),
        };
        let cfg = build_config(&args, &file_config()).unwrap();
        assert_eq!(cfg.user_id, "222");
        assert_eq!(cfg.api_key, "CLIKEY");
        assert_eq!(cfg.collection.as_deref(), Some("COLL"));
        assert_eq!(cfg.read_timeout, Duration::from_secs(5));
        assert!(cfg.abort_on_rejected_query);
        assert_eq!(cfg.paths.key_store, PathBuf::from("/data/key.txt"));
    }

    #[test]
    fn file_values_used_by_default() {
        let args = SyncArgs {
            dir: PathBuf::from("."),
            ..Default::default()
        };
        let cfg = build_config(&args, &file_config()).unwrap();
        assert_eq!(cfg.user_id, "111");
        assert_eq!(cfg.api_key, "FILEKEY");
        assert!(cfg.collection.is_none());
        assert!(!cfg.abort_on_rejected_query);
    }

    #[test]
    fn empty_collection_is_none() {
        let args = SyncArgs {
            collection: Some(" ".into()),
            ..Default::default()
        };
        let cfg = build_config(&args, &file_config()).unwrap();
        assert!(cfg.collection.is_none());
    }

    #[test]
    fn missing_credentials_rejected() {
        let mut config = file_config();
        config.zotero.api_key = None;
        let err = build_config(&SyncArgs::default(), &config).unwrap_err();
        assert!(err.to_string().contains("API key"));

        let mut config = file_config();
        config.zotero.user_id = String::new();
        let err = build_config(&SyncArgs::default(), &config).unwrap_err();
        assert!(err.to_string().contains("user id"));
    }
}
