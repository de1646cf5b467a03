use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "quotesync",
    version,
    about = "Keep a local quote collection in sync with a remote service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Sync periodically until interrupted (default if no subcommand given).
    Run {
        /// Override QS_SYNC_INTERVAL_SECS.
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Run one sync cycle now and print its report as JSON.
    Sync,

    /// Add a quote locally; it is pushed on the next sync.
    Add {
        #[arg(long)]
        text: String,
        #[arg(long)]
        category: String,
    },

    /// Print quotes, optionally filtered by category (case-insensitive).
    List {
        #[arg(long, default_value = "all")]
        category: String,
    },

    /// Print the distinct categories.
    Categories,

    /// Append quotes from a JSON file (ids are dropped).
    Import {
        /// Path to a JSON array of {text, category} records.
        path: PathBuf,
    },

    /// Write the current collection to a JSON file.
    Export { path: PathBuf },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            interval_secs: None,
        }
    }
}
