//! Command handlers: one store operation per command, rendering included.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dialoguer::Confirm;
use pv_core::{config, PromptStore, PromptVersion};
use serde_json::json;
use tracing::debug;

use crate::{Cli, Command};

pub fn run(cli: Cli) -> Result<()> {
    let db = match cli.db {
        Some(path) => path,
        None => config::default_db_path()?,
    };
    debug!(db = %db.display(), "database resolved");

    match cli.command {
        Command::Init => init(&db),
        Command::Add { name, content, file, tag, note } => {
            add(&db, &name, content, file, &tag, note.as_deref())
        },
        Command::List { json } => list(&db, json),
        Command::Log { name, json } => log(&db, &name, json),
        Command::Show { name, version, json } => show(&db, &name, version, json),
        Command::Diff { name, v1, v2 } => diff(&db, &name, v1, v2),
        Command::Rollback { name, version } => rollback(&db, &name, version),
        Command::Tag { name, version, add, remove } => tag(&db, &name, version, &add, &remove),
        Command::Export { name, output } => export(&db, &name, output),
        Command::Delete { name, yes } => delete(&db, &name, yes),
    }
}

fn init(db: &Path) -> Result<()> {
    PromptStore::open(db)?;
    println!(
        "{} Database initialized at {}",
        "✓".green(),
        db.display().to_string().bold()
    );
    Ok(())
}

fn add(
    db: &Path,
    name: &str,
    content: Option<String>,
    file: Option<PathBuf>,
    tags: &[String],
    note: Option<&str>,
) -> Result<()> {
    if content.is_some() && file.is_some() {
        bail!("Provide --content or --file, not both.");
    }
    let content = match (content, file) {
        (_, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("File not found: {}", path.display()))?,
        (Some(text), None) if text == "-" => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        },
        (Some(text), None) => text,
        (None, None) => bail!("Provide prompt content via --content or --file."),
    };

    let mut store = PromptStore::open(db)?;
    let version = store.add_version(name, &content, tags, note)?;
    println!(
        "{} Added {} v{} (hash: {}…)",
        "✓".green(),
        name.bold(),
        version.version_number,
        short_hash(&version.content_hash)
    );
    Ok(())
}

fn list(db: &Path, as_json: bool) -> Result<()> {
    let store = PromptStore::open(db)?;
    let prompts = store.list_prompts()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&prompts)?);
        return Ok(());
    }
    if prompts.is_empty() {
        println!("{}", "No prompts found.".dimmed());
        return Ok(());
    }

    // Pad before coloring so ANSI escapes do not skew column widths.
    let name_width = prompts
        .iter()
        .map(|p| p.name.len())
        .chain(std::iter::once("NAME".len()))
        .max()
        .unwrap_or(4);
    let header = format!("{:<name_width$}  {:>8}  {:>6}  CREATED", "NAME", "VERSIONS", "LATEST");
    println!("{}", header.bold());
    for p in &prompts {
        let latest = p.latest.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{}  {:>8}  {:>6}  {}",
            format!("{:<name_width$}", p.name).cyan(),
            p.versions,
            latest,
            short_time(&p.created_at).dimmed()
        );
    }
    Ok(())
}

fn log(db: &Path, name: &str, as_json: bool) -> Result<()> {
    let store = PromptStore::open(db)?;
    let versions = store.get_log(name)?;

    if as_json {
        let data: Vec<_> = versions
            .iter()
            .map(|v| {
                json!({
                    "version": v.version_number,
                    "hash": short_hash(&v.content_hash),
                    "note": v.note,
                    "tags": v.tags,
                    "created_at": v.created_at,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }
    if versions.is_empty() {
        println!("{}", format!("No versions for '{}'.", name).dimmed());
        return Ok(());
    }

    let header = format!(
        "{:>7}  {:<12}  {:<20}  {:<20}  CREATED",
        "VERSION", "HASH", "TAGS", "NOTE"
    );
    println!("{}", header.bold());
    for v in &versions {
        let tags = if v.tags.is_empty() { "-".to_string() } else { v.tags.join(", ") };
        println!(
            "{}  {}  {:<20}  {:<20}  {}",
            format!("{:>7}", v.version_number).cyan(),
            format!("{:<12}", short_hash(&v.content_hash)).dimmed(),
            tags,
            v.note.as_deref().unwrap_or("-"),
            short_time(&v.created_at).dimmed()
        );
    }
    Ok(())
}

fn show(db: &Path, name: &str, number: Option<i64>, as_json: bool) -> Result<()> {
    let store = PromptStore::open(db)?;
    let version = store.get_version(name, number)?;

    if as_json {
        let data = json!({
            "name": name,
            "version": version.version_number,
            "content": version.content,
            "hash": version.content_hash,
            "note": version.note,
            "tags": version.tags,
            "created_at": version.created_at,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} v{}", name.cyan().bold(), version.version_number);
    println!("{}", metadata_line(&version).dimmed());
    println!();
    println!("{}", version.content);
    Ok(())
}

fn diff(db: &Path, name: &str, v1: i64, v2: i64) -> Result<()> {
    let store = PromptStore::open(db)?;
    let result = store.diff(name, v1, v2)?;

    if result.is_empty() {
        println!("{}", "No differences.".dimmed());
        return Ok(());
    }
    for line in result.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{}", line);
        }
    }
    Ok(())
}

fn rollback(db: &Path, name: &str, target: i64) -> Result<()> {
    let mut store = PromptStore::open(db)?;
    let version = store.rollback(name, target)?;
    println!(
        "{} Rolled back {} to v{} -> new v{}",
        "✓".green(),
        name.bold(),
        target,
        version.version_number
    );
    Ok(())
}

fn tag(db: &Path, name: &str, number: i64, add: &[String], remove: &[String]) -> Result<()> {
    if add.is_empty() && remove.is_empty() {
        bail!("Provide --add and/or --remove.");
    }

    let mut store = PromptStore::open(db)?;
    for t in add {
        store.tag_add(name, number, t)?;
    }
    for t in remove {
        store.tag_remove(name, number, t)?;
    }
    println!("{} Updated tags on {} v{}", "✓".green(), name.bold(), number);
    Ok(())
}

fn export(db: &Path, name: &str, output: Option<PathBuf>) -> Result<()> {
    let store = PromptStore::open(db)?;
    let document = store.export_history(name)?;
    let json = serde_json::to_string_pretty(&document)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            println!("{} Exported {} to {}", "✓".green(), name.bold(), path.display());
        },
        None => println!("{}", json),
    }
    Ok(())
}

fn delete(db: &Path, name: &str, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete prompt '{}' and all its versions?", name))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Aborted.".dimmed());
            return Ok(());
        }
    }

    let mut store = PromptStore::open(db)?;
    store.delete_prompt(name)?;
    println!("{} Deleted {}", "✓".green(), name.bold());
    Ok(())
}

fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}

fn metadata_line(version: &PromptVersion) -> String {
    let tags = if version.tags.is_empty() { "none".to_string() } else { version.tags.join(", ") };
    format!(
        "Hash: {} | Tags: {} | Note: {}",
        short_hash(&version.content_hash),
        tags,
        version.note.as_deref().unwrap_or("none")
    )
}

fn short_time(ts: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| ts.to_string())
}
