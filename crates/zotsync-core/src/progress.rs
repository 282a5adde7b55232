//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: one indicatif bar counting fetched items.
//! Non-TTY mode: log-based output (no progress bars).

use std::io::IsTerminal;
use std::sync::Arc;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Item counter bar: `[bar] 12/40 KEY`
fn item_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:<8.dim} {bar:30.green/dim} {pos:>5}/{len:5} {eta:>4} {wide_msg:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("--")
}

/// Central progress context managing multi-progress bars.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY automatically.
    pub fn new() -> Self {
        let is_tty = std::io::stderr().is_terminal();
        Self {
            multi: MultiProgress::new(),
            is_tty,
        }
    }

    /// Context that never draws, for tests and piped runs.
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: false,
        }
    }

    /// Create the per-run item bar.
    ///
    /// TTY: visible bar, length set once the missing count is known.
    /// Non-TTY: hidden (no-op).
    pub fn item_bar(&self, name: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }

        let pb = self.multi.add(ProgressBar::new(0));
        pb.set_style(item_style());
        pb.set_prefix(name.to_string());
        pb
    }

    /// Print a line to stdout, suspending the bars while it is written.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.is_tty {
            self.multi.suspend(|| println!("{}", msg.as_ref()));
        } else {
            println!("{}", msg.as_ref());
        }
    }

    /// Whether running in TTY mode.
    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Get reference to `MultiProgress` for log bridge.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper for `ProgressContext`.
pub type SharedProgress = Arc<ProgressContext>;
