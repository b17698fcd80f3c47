//! pv-core: local version control for text prompts
//!
//! This crate owns all persisted state for the `pv` CLI:
//! - Prompts: named, ordered histories of content versions
//! - Versions: immutable snapshots with SHA-256 hash, note, tags, timestamp
//! - Tags: freely mutable labels on existing versions
//!
//! ## Architecture
//!
//! - **Storage**: a single SQLite file (rusqlite, WAL mode, foreign keys on)
//! - **Store**: [`PromptStore`] wraps one connection; every operation runs
//!   in its own transaction and either commits fully or leaves no trace
//! - **No rendering**: operations return plain structured data and typed
//!   errors; the CLI crate owns all formatting

pub mod config;
pub mod db;
pub mod diff;
pub mod errors;

pub use db::prompts::{Prompt, PromptExport, PromptSummary, PromptVersion};
pub use db::PromptStore;
pub use errors::{PvError, Result};
