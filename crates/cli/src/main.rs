//! pv: local version control for text prompts.
//!
//! Thin command surface over the `pv-core` store: parse arguments, resolve
//! the database location, run exactly one store operation, render the
//! result as text or JSON. All errors land on stderr with exit code 1.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pv",
    version,
    about = "prompt-version-control: version your prompts locally.",
    arg_required_else_help = true
)]
struct Cli {
    /// Override path to the SQLite database
    #[arg(long, env = "PV_DB", global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize the pv database
    Init,

    /// Add a new version of a prompt
    Add {
        /// Prompt name
        name: String,

        /// Prompt content. Use - to read from stdin
        #[arg(short, long)]
        content: Option<String>,

        /// Read prompt content from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Tags for this version (repeatable)
        #[arg(short, long = "tag")]
        tag: Vec<String>,

        /// Optional note for this version
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List all prompts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version history for a prompt
    Log {
        /// Prompt name
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the content of a prompt version
    Show {
        /// Prompt name
        name: String,

        /// Version number (default: latest)
        #[arg(short = 'v', long)]
        version: Option<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a unified diff between two versions of a prompt
    Diff {
        /// Prompt name
        name: String,

        /// First version number
        v1: i64,

        /// Second version number
        v2: i64,
    },

    /// Rollback a prompt to a previous version (creates a new version)
    Rollback {
        /// Prompt name
        name: String,

        /// Version number to rollback to
        version: i64,
    },

    /// Add or remove tags on a prompt version
    Tag {
        /// Prompt name
        name: String,

        /// Version number
        version: i64,

        /// Tags to add (repeatable)
        #[arg(short = 'a', long = "add")]
        add: Vec<String>,

        /// Tags to remove (repeatable)
        #[arg(short = 'r', long = "remove")]
        remove: Vec<String>,
    },

    /// Export all versions of a prompt as JSON
    Export {
        /// Prompt name
        name: String,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a prompt and all its versions
    Delete {
        /// Prompt name
        name: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = commands::run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}
