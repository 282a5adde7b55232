//! zotsync Zotero - incremental sync of a Zotero library
//!
//! Fetches the library's key list, works out which items are not yet in the
//! local key store, and downloads each missing item's Atom entry.
//!
//! # Features
//!
//! - Order-preserving delta against a newline-delimited key store
//! - Streaming Atom parsing with quick-xml
//! - Journaled commits so an interrupted run resumes cleanly
//! - Progress file for an external poller
//!
//! # Example
//!
//! ```ignore
//! use zotsync_zotero::{Config, run};
//!
//! let config = Config {
//!     user_id: "123456".into(),
//!     api_key: "secret".into(),
//!     ..Default::default()
//! };
//!
//! let summary = run(&config, &zotsync_core::ProgressContext::new())?;
//! println!("Saved {} items", summary.parsed);
//! ```

pub mod api;
pub mod config;
pub mod entry;
pub mod error;
pub mod journal;
pub mod keys;
pub mod record;
pub mod runner;
pub mod status;

// Re-exports
pub use api::{ItemSource, ZoteroClient};
pub use config::{Config, SyncPaths};
pub use error::SyncError;
pub use runner::{Summary, Syncer, run};
pub use status::{LastUpdate, ProgressFile, ProgressState};
