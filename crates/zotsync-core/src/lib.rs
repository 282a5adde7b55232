//! zotsync Core - Common infrastructure for the Zotero sync tool
//!
//! This crate provides the blocking HTTP layer, logging setup, terminal
//! progress display, and the small file primitives the sync relies on.

pub mod fsutil;
pub mod http;
pub mod logging;
pub mod progress;

// Re-exports for convenience
pub use fsutil::{append_line, read_optional, write_atomic};
pub use http::{FetchError, get_text};
pub use logging::init_logging;
pub use progress::{ProgressContext, SharedProgress};
