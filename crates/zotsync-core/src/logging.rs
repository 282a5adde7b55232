//! Logging setup for the `zotsync` binary.
//!
//! On a terminal, log lines are printed through the progress bars so they do
//! not tear them. Otherwise they go to stdout as plain `[LEVEL] message`
//! lines for the process driving the sync.

use std::io::Write;

use indicatif::MultiProgress;

/// Fixed-width label for a log level
fn level_label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

fn level_color(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug => "\x1b[36m",
        log::Level::Trace => "\x1b[35m",
    }
}

/// One rendered log line, colored for terminals.
fn render(level: log::Level, args: &std::fmt::Arguments<'_>, color: bool) -> String {
    let label = level_label(level);
    if color {
        format!("[{}{label}\x1b[0m] {args}", level_color(level))
    } else {
        format!("[{label}] {args}")
    }
}

/// Default filter from the CLI verbosity flags; `RUST_LOG` still wins.
fn default_level(quiet: bool, debug: bool) -> &'static str {
    if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Terminal logger that suspends the progress bars for each line.
struct BarLogger {
    filter: env_logger::Logger,
    multi: MultiProgress,
}

impl log::Log for BarLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.filter.matches(record) {
            let line = render(record.level(), record.args(), true);
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {}
}

/// Install the global logger. Call once, from the binary.
///
/// `multi` is the progress display on a terminal, `None` when piped.
pub fn init_logging(quiet: bool, debug: bool, multi: Option<&MultiProgress>) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level(quiet, debug)),
    );

    match multi {
        Some(multi) => {
            let filter = builder.build();
            let max_level = filter.filter();
            log::set_boxed_logger(Box::new(BarLogger {
                filter,
                multi: multi.clone(),
            }))
            .expect("failed to init logger");
            log::set_max_level(max_level);
        }
        None => builder
            .target(env_logger::Target::Stdout)
            .format(|buf, record| {
                writeln!(buf, "{}", render(record.level(), record.args(), false))
            })
            .init(),
    }
}
