//! Platform-aware default location for the pv database.

use std::path::PathBuf;

use crate::errors::{PvError, Result};

const DB_FILENAME: &str = "pv.db";
const APP_DIR: &str = "pv";

/// Get the platform-default database path (<data dir>/pv/pv.db)
///
/// Linux: ~/.local/share/pv/pv.db, macOS: ~/Library/Application Support/pv/pv.db
pub fn default_db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| PvError::Config("could not determine user data directory".into()))?;

    Ok(data_dir.join(APP_DIR).join(DB_FILENAME))
}
