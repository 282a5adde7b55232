//! Status subcommand - report the state of the last sync run

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use zotsync_zotero::{LastUpdate, ProgressFile, ProgressState};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Directory relative file paths are resolved against
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,
}

/// One-line description of a progress state
fn describe(state: Option<&ProgressState>) -> String {
    match state {
        None => "never run".to_string(),
        Some(ProgressState::Running { done, total }) => format!("in progress ({done}/{total})"),
        Some(ProgressState::Done { parsed }) => format!("done, {parsed} items saved"),
        Some(ProgressState::Failed(message)) => format!("failed: {message}"),
    }
}

pub fn run(args: StatusArgs, config: &Config) -> Result<()> {
    let paths = config.files.resolve(&args.dir);

    let state = ProgressFile::new(&paths.progress)
        .read()
        .with_context(|| format!("Failed to read {}", paths.progress.display()))?;
    let last = LastUpdate::new(&paths.last_update)
        .read()
        .with_context(|| format!("Failed to read {}", paths.last_update.display()))?;

    println!("Status:      {}", describe(state.as_ref()));
    match last {
        Some(at) => println!("Last update: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Last update: never"),
    }

    if state.as_ref().is_some_and(ProgressState::is_failed) {
        bail!("last sync failed");
    }
    Ok(())
}
