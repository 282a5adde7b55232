//! zotsync - Incremental Zotero library sync
//!
//! Downloads metadata for Zotero items that are not yet recorded locally and
//! keeps a progress file an external program can poll.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "zotsync")]
#[command(about = "Incremental Zotero library sync")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file path (default: ./zotsync.toml or ~/.config/zotsync/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch items missing from the local key store
    Sync(cmd::sync::SyncArgs),
    /// Show the state of the last sync run
    Status(cmd::status::StatusArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(zotsync_core::ProgressContext::new());

    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    zotsync_core::init_logging(cli.quiet, cli.debug, multi);

    // Load configuration
    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Sync(args) => cmd::sync::run(args, &config, &progress),
        Command::Status(args) => cmd::status::run(args, &config),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            let zotero = &config.zotero;
            table.add_row(vec![
                "User id",
                if zotero.user_id.is_empty() {
                    "not set"
                } else {
                    &zotero.user_id
                },
            ]);
            table.add_row(vec![
                "API key",
                if zotero.api_key.is_some() {
                    "configured"
                } else {
                    "not set"
                },
            ]);
            table.add_row(vec![
                "Collection",
                zotero.collection.as_deref().unwrap_or("(all items)"),
            ]);
            table.add_row(vec!["Base URL", &zotero.base_url]);

            let files = &config.files;
            table.add_row(vec!["Key store", &files.key_store.display().to_string()]);
            table.add_row(vec!["Records", &files.records.display().to_string()]);
            table.add_row(vec!["Progress", &files.progress.display().to_string()]);
            table.add_row(vec![
                "Last update",
                &files.last_update.display().to_string(),
            ]);
            table.add_row(vec![
                "Read timeout",
                &format!("{}s", config.http.read_timeout),
            ]);
            table.add_row(vec![
                "Abort on rejected query",
                &config.sync.abort_on_rejected_query.to_string(),
            ]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
