//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

pub mod commands;
pub mod output;

pub use commands::Commands;

/// Kube Triage: match container failures to remediation runbooks.
#[derive(Parser, Debug)]
#[command(name = "kt", version, about, long_about = None)]
pub struct Cli {
    /// Machine-readable JSON output on stdout
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (overrides global and project config)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Corpus file or directory (repeatable; replaces configured paths)
    #[arg(long, global = true, value_name = "PATH")]
    pub corpus: Vec<PathBuf>,

    /// Document separator token
    #[arg(long, global = true, value_name = "TOKEN")]
    pub separator: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
