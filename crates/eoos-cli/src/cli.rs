//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Elimination-event detection for two-tank weight scales.
///
/// Reads prepared per-tick readings (one JSON object per line) and reports
/// the intervals during which either tank gained mass.
#[derive(Debug, Parser)]
#[command(name = "eoos", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect events in one readings file.
    Detect {
        /// JSONL file of readings (`date_time`, `feces`, `urine`, `flow`).
        file: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Include events the outlier filter would hide.
        #[arg(long)]
        all: bool,
    },

    /// Detect events in every `*.jsonl` file of a directory, one per date.
    Batch {
        /// Directory containing one readings file per date.
        dir: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as JSON.
    Config,
}
