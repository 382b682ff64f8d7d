//! CLI argument parsing for the event concierge.

use clap::{Parser, Subcommand};

/// Event Concierge
///
/// On-device semantic agenda building and catalog question answering.
#[derive(Parser, Debug)]
#[command(name = "concierge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/event-concierge/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Concierge commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a non-overlapping personal agenda from an interest
    Plan {
        /// Event identifier (directory under the data root)
        #[arg(short, long)]
        event: String,

        /// What you are into, in free text
        #[arg(short, long)]
        interest: String,

        /// Restrict to one day label (e.g. "Day 2")
        #[arg(long)]
        day: Option<String>,

        /// Earliest session start, 24h clock (e.g. "09:30")
        #[arg(long)]
        earliest: Option<String>,

        /// Maximum sessions on the agenda (1-8)
        #[arg(long, default_value_t = 4)]
        max: usize,

        /// Boost sessions whose format contains this category
        #[arg(long)]
        boost: Option<String>,
    },

    /// Find the catalog items most relevant to a question
    Ask {
        /// Event identifier (directory under the data root)
        #[arg(short, long)]
        event: String,

        /// The question to answer
        #[arg(short, long)]
        question: String,

        /// Number of matches to show
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// Opt in to on-device models
    Enable,

    /// Opt out of on-device models
    Disable,

    /// Drop cached embeddings for an event
    ClearCache {
        /// Event identifier
        #[arg(short, long)]
        event: String,
    },
}
