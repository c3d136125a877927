//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Lapse CLI - Check how long documents have before they expire.
#[derive(Debug, Parser)]
#[command(name = "lapse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Router base URL
    #[arg(short, long, global = true, env = "LAPSE_URL", default_value = "http://127.0.0.1:9001")]
    pub url: String,

    /// Print raw JSON responses
    #[arg(long, global = true)]
    pub json: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query a document's remaining TTL once
    Status {
        /// Document identifier
        document_id: String,
    },

    /// Keep polling a document's TTL and warn while it is counting down
    Watch {
        /// Document identifier
        document_id: String,

        /// Stop after this many polls
        #[arg(long)]
        max_polls: Option<usize>,
    },
}
