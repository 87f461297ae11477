//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use shotline::EntryId;
use std::path::PathBuf;

/// Shotline - versioned storyboard shots for screenplay episodes
#[derive(Parser, Debug)]
#[command(name = "shotline")]
#[command(about = "Versioned storyboard shots for screenplay episodes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file (defaults to the layered lookup)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge a model reply into an episode's shots
    Apply {
        /// Episode identifier
        #[arg(long)]
        episode: String,

        /// File holding the raw model reply
        #[arg(long)]
        reply: PathBuf,

        /// Scene being edited; unmatched shots fall back to it
        #[arg(long)]
        scene: Option<String>,

        /// First number for shots that carry none
        #[arg(long)]
        start: Option<u32>,

        /// Operator message that prompted the reply
        #[arg(long)]
        message: Option<String>,
    },

    /// List an episode's shots
    Entries {
        /// Episode identifier
        #[arg(long)]
        episode: String,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Show the revision history of one shot
    History {
        /// Episode identifier
        #[arg(long)]
        episode: String,

        /// Entry identifier
        #[arg(long, value_parser = parse_entry_id)]
        entry: EntryId,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Mark a shot as approved
    Approve {
        /// Episode identifier
        #[arg(long)]
        episode: String,

        /// Entry identifier
        #[arg(long, value_parser = parse_entry_id)]
        entry: EntryId,
    },

    /// Roll a shot back to an earlier version
    Restore {
        /// Episode identifier
        #[arg(long)]
        episode: String,

        /// Entry identifier
        #[arg(long, value_parser = parse_entry_id)]
        entry: EntryId,

        /// Version to restore
        #[arg(long)]
        version: u32,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

fn parse_entry_id(value: &str) -> Result<EntryId, String> {
    EntryId::parse(value).ok_or_else(|| format!("'{}' is not an entry id", value))
}
