//! Prompt and version operations.
//!
//! All writes go through a transaction on the store's connection; helpers
//! below operate on whatever connection (or transaction) they are handed so
//! compound operations like rollback stay atomic.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::PromptStore;
use crate::errors::{PvError, Result};

/// A named prompt history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub name:       String,
    pub created_at: String,
}

/// One immutable snapshot of a prompt's content
///
/// Serializes with the export field names (`version`, `hash`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptVersion {
    #[serde(rename = "version")]
    pub version_number: i64,
    pub content:        String,
    #[serde(rename = "hash")]
    pub content_hash:   String,
    pub note:           Option<String>,
    pub tags:           Vec<String>,
    pub created_at:     String,
}

/// One row of `list_prompts` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSummary {
    pub name:       String,
    pub versions:   i64,
    pub latest:     Option<i64>,
    pub created_at: String,
    /// Timestamp of the newest version, if any
    pub updated_at: Option<String>,
}

/// Full export document for one prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptExport {
    pub name:       String,
    pub created_at: String,
    pub versions:   Vec<PromptVersion>,
}

/// Lowercase hex SHA-256 of the content bytes
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PvError::Validation("prompt name must not be empty".into()));
    }
    Ok(())
}

fn validate_tag(tag: &str) -> Result<()> {
    if tag.trim().is_empty() {
        return Err(PvError::Validation("tag must not be empty".into()));
    }
    Ok(())
}

struct PromptRow {
    id:         i64,
    name:       String,
    created_at: String,
}

fn find_prompt(conn: &Connection, name: &str) -> Result<Option<PromptRow>> {
    let row = conn
        .query_row(
            "SELECT id, name, created_at FROM prompts WHERE name = ?1",
            params![name],
            |row| {
                Ok(PromptRow {
                    id:         row.get(0)?,
                    name:       row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

fn require_prompt(conn: &Connection, name: &str) -> Result<PromptRow> {
    find_prompt(conn, name)?
        .ok_or_else(|| PvError::NotFound(format!("Prompt '{}' not found", name)))
}

fn max_version(conn: &Connection, prompt_id: i64) -> Result<i64> {
    let max: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version_number), 0) FROM prompt_versions WHERE prompt_id = ?1",
        params![prompt_id],
        |row| row.get(0),
    )?;
    Ok(max)
}

fn load_tags(conn: &Connection, version_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name FROM tags t
         JOIN prompt_version_tags pvt ON pvt.tag_id = t.id
         WHERE pvt.version_id = ?1
         ORDER BY t.name",
    )?;
    let tags = stmt
        .query_map(params![version_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(tags)
}

fn get_or_create_tag(conn: &Connection, tag: &str) -> Result<i64> {
    conn.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", params![tag])?;
    let id: i64 = conn.query_row(
        "SELECT id FROM tags WHERE name = ?1",
        params![tag],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Fetch one version row (internal id plus public view), tags included
fn find_version(
    conn: &Connection,
    prompt_id: i64,
    number: i64,
) -> Result<Option<(i64, PromptVersion)>> {
    let row = conn
        .query_row(
            "SELECT id, version_number, content, content_hash, note, created_at
             FROM prompt_versions
             WHERE prompt_id = ?1 AND version_number = ?2",
            params![prompt_id, number],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    PromptVersion {
                        version_number: row.get(1)?,
                        content:        row.get(2)?,
                        content_hash:   row.get(3)?,
                        note:           row.get(4)?,
                        tags:           Vec::new(),
                        created_at:     row.get(5)?,
                    },
                ))
            },
        )
        .optional()?;

    match row {
        Some((id, mut version)) => {
            version.tags = load_tags(conn, id)?;
            Ok(Some((id, version)))
        },
        None => Ok(None),
    }
}

fn require_version(
    conn: &Connection,
    prompt: &PromptRow,
    number: i64,
) -> Result<(i64, PromptVersion)> {
    find_version(conn, prompt.id, number)?.ok_or_else(|| {
        PvError::NotFound(format!(
            "Version {} not found for prompt '{}'",
            number, prompt.name
        ))
    })
}

fn check_range(prompt: &PromptRow, number: i64, max: i64) -> Result<()> {
    if number < 1 || number > max {
        return Err(PvError::InvalidVersionRange {
            prompt:  prompt.name.clone(),
            version: number,
            max,
        });
    }
    Ok(())
}

fn get_or_create_prompt(conn: &Connection, name: &str) -> Result<PromptRow> {
    if let Some(row) = find_prompt(conn, name)? {
        return Ok(row);
    }
    let created_at = now();
    conn.execute(
        "INSERT INTO prompts (name, created_at) VALUES (?1, ?2)",
        params![name, created_at],
    )?;
    Ok(PromptRow {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        created_at,
    })
}

/// Insert the next version of an existing prompt and attach its tags
fn insert_version(
    conn: &Connection,
    prompt: &PromptRow,
    content: &str,
    tags: &[String],
    note: Option<&str>,
) -> Result<PromptVersion> {
    let number = max_version(conn, prompt.id)? + 1;
    let hash = content_hash(content);
    let created_at = now();

    conn.execute(
        "INSERT INTO prompt_versions
             (prompt_id, version_number, content, content_hash, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![prompt.id, number, content, hash, note, created_at],
    )?;
    let version_id = conn.last_insert_rowid();

    for tag in tags {
        let tag_id = get_or_create_tag(conn, tag)?;
        conn.execute(
            "INSERT OR IGNORE INTO prompt_version_tags (version_id, tag_id) VALUES (?1, ?2)",
            params![version_id, tag_id],
        )?;
    }

    Ok(PromptVersion {
        version_number: number,
        content: content.to_string(),
        content_hash: hash,
        note: note.map(String::from),
        tags: load_tags(conn, version_id)?,
        created_at,
    })
}

impl PromptStore {
    /// Create a prompt with an empty version list, or return the existing one
    pub fn create_prompt_if_absent(&mut self, name: &str) -> Result<Prompt> {
        validate_name(name)?;
        let tx = self.conn.transaction()?;
        let row = get_or_create_prompt(&tx, name)?;
        tx.commit()?;
        Ok(Prompt {
            name:       row.name,
            created_at: row.created_at,
        })
    }

    /// Add a new version to a prompt, creating the prompt if needed
    ///
    /// Byte-identical re-adds still create a new version; the matching
    /// hashes make them visible in `log` output.
    pub fn add_version(
        &mut self,
        name: &str,
        content: &str,
        tags: &[String],
        note: Option<&str>,
    ) -> Result<PromptVersion> {
        validate_name(name)?;
        if content.is_empty() {
            return Err(PvError::Validation("content must not be empty".into()));
        }
        for tag in tags {
            validate_tag(tag)?;
        }

        let tx = self.conn.transaction()?;
        let prompt = get_or_create_prompt(&tx, name)?;
        let version = insert_version(&tx, &prompt, content, tags, note)?;
        tx.commit()?;

        debug!(prompt = name, version = version.version_number, "version added");
        Ok(version)
    }

    /// List all prompts ordered by name
    pub fn list_prompts(&self) -> Result<Vec<PromptSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.name, p.created_at,
                    COUNT(v.id), MAX(v.version_number), MAX(v.created_at)
             FROM prompts p
             LEFT JOIN prompt_versions v ON v.prompt_id = p.id
             GROUP BY p.id
             ORDER BY p.name ASC",
        )?;
        let summaries = stmt
            .query_map([], |row| {
                Ok(PromptSummary {
                    name:       row.get(0)?,
                    created_at: row.get(1)?,
                    versions:   row.get(2)?,
                    latest:     row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    /// Version history for a prompt, ascending by version number
    pub fn get_log(&self, name: &str) -> Result<Vec<PromptVersion>> {
        let prompt = require_prompt(&self.conn, name)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, version_number, content, content_hash, note, created_at
             FROM prompt_versions
             WHERE prompt_id = ?1
             ORDER BY version_number ASC",
        )?;
        let rows = stmt
            .query_map(params![prompt.id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    PromptVersion {
                        version_number: row.get(1)?,
                        content:        row.get(2)?,
                        content_hash:   row.get(3)?,
                        note:           row.get(4)?,
                        tags:           Vec::new(),
                        created_at:     row.get(5)?,
                    },
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut versions = Vec::with_capacity(rows.len());
        for (id, mut version) in rows {
            version.tags = load_tags(&self.conn, id)?;
            versions.push(version);
        }
        Ok(versions)
    }

    /// Fetch one version; `None` means latest
    pub fn get_version(&self, name: &str, number: Option<i64>) -> Result<PromptVersion> {
        let prompt = require_prompt(&self.conn, name)?;
        let number = match number {
            Some(n) => n,
            None => {
                let max = max_version(&self.conn, prompt.id)?;
                if max == 0 {
                    return Err(PvError::NotFound(format!(
                        "No versions found for prompt '{}'",
                        name
                    )));
                }
                max
            },
        };
        let (_, version) = require_version(&self.conn, &prompt, number)?;
        Ok(version)
    }

    /// Unified diff between two versions, in the order given
    ///
    /// Identical content yields an empty string.
    pub fn diff(&self, name: &str, v1: i64, v2: i64) -> Result<String> {
        let prompt = require_prompt(&self.conn, name)?;
        let max = max_version(&self.conn, prompt.id)?;
        check_range(&prompt, v1, max)?;
        check_range(&prompt, v2, max)?;

        let (_, old) = require_version(&self.conn, &prompt, v1)?;
        let (_, new) = require_version(&self.conn, &prompt, v2)?;
        Ok(crate::diff::unified(name, v1, v2, &old.content, &new.content))
    }

    /// Roll a prompt back to an earlier version by appending a copy of it
    ///
    /// The target version is never mutated; its content and tags are copied
    /// into a new version whose note records the rollback origin.
    pub fn rollback(&mut self, name: &str, target: i64) -> Result<PromptVersion> {
        let tx = self.conn.transaction()?;
        let prompt = require_prompt(&tx, name)?;
        let max = max_version(&tx, prompt.id)?;
        check_range(&prompt, target, max)?;

        let (_, old) = require_version(&tx, &prompt, target)?;
        let note = format!("Rollback to v{}", target);
        let version = insert_version(&tx, &prompt, &old.content, &old.tags, Some(&note))?;
        tx.commit()?;

        debug!(prompt = name, target, new = version.version_number, "rollback");
        Ok(version)
    }

    /// Add a tag to an existing version; adding a present tag is a no-op
    pub fn tag_add(&mut self, name: &str, number: i64, tag: &str) -> Result<()> {
        validate_tag(tag)?;
        let tx = self.conn.transaction()?;
        let prompt = require_prompt(&tx, name)?;
        let (version_id, _) = require_version(&tx, &prompt, number)?;
        let tag_id = get_or_create_tag(&tx, tag)?;
        tx.execute(
            "INSERT OR IGNORE INTO prompt_version_tags (version_id, tag_id) VALUES (?1, ?2)",
            params![version_id, tag_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Remove a tag from an existing version; removing an absent tag is a no-op
    pub fn tag_remove(&mut self, name: &str, number: i64, tag: &str) -> Result<()> {
        validate_tag(tag)?;
        let tx = self.conn.transaction()?;
        let prompt = require_prompt(&tx, name)?;
        let (version_id, _) = require_version(&tx, &prompt, number)?;
        tx.execute(
            "DELETE FROM prompt_version_tags
             WHERE version_id = ?1
               AND tag_id = (SELECT id FROM tags WHERE name = ?2)",
            params![version_id, tag],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Full ordered history of a prompt as a serializable document
    pub fn export_history(&self, name: &str) -> Result<PromptExport> {
        let prompt = require_prompt(&self.conn, name)?;
        let versions = self.get_log(name)?;
        Ok(PromptExport {
            name:       prompt.name,
            created_at: prompt.created_at,
            versions,
        })
    }

    /// Delete a prompt and all its versions
    pub fn delete_prompt(&mut self, name: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        let prompt = require_prompt(&tx, name)?;
        tx.execute("DELETE FROM prompts WHERE id = ?1", params![prompt.id])?;
        tx.commit()?;
        debug!(prompt = name, "prompt deleted");
        Ok(())
    }
}
