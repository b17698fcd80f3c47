//! SQLite-backed version store.
//!
//! [`PromptStore`] owns a single connection to the database file. Every
//! public operation runs inside one transaction so a failed `add` cannot
//! leave a half-created prompt behind.

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::errors::Result;

pub mod prompts;
pub mod schema;

/// Handle to the on-disk prompt database
pub struct PromptStore {
    conn: Connection,
}

impl PromptStore {
    /// Open (or create) the database at `path` and apply the schema
    ///
    /// Idempotent: safe to call against an already-initialized database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            // parent is "" for bare relative filenames
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self::init(conn)?;
        debug!(path = %path.display(), "prompt store opened");
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // foreign_keys is off by default in SQLite; the schema relies on
        // ON DELETE CASCADE from prompts down to tag memberships.
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self { conn })
    }
}
