//! CLI Argument Parsing
//!
//! Global flags (--json, --verbose, --quiet, --config) are inherited by all subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tabtree - replay and inspect browser tab trees
#[derive(Parser, Debug)]
#[command(name = "tabtree")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config file (default: the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a session log and print the resulting tree
    Replay {
        /// NDJSON file of host events, command results and actions ("-" for stdin)
        events: PathBuf,

        /// Start from this snapshot instead of an empty forest
        #[arg(long, value_name = "FILE")]
        snapshot: Option<PathBuf>,

        /// Write the final forest to this snapshot file
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,

        /// Filter the printed view by title or address
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,

        /// Write issued host commands to this file as NDJSON
        #[arg(long, value_name = "FILE")]
        commands: Option<PathBuf>,
    },

    /// Verify a snapshot file and report what restore would repair
    Check {
        /// Snapshot file
        snapshot: PathBuf,
    },
}

impl Cli {
    /// Default tracing filter for the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
