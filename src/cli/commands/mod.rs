//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod completions;
pub mod doctor;
pub mod index;
pub mod list;
pub mod show;
pub mod triage;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Match an error message or log excerpt against the corpus
    Triage(triage::TriageArgs),

    /// Build the index and report its statistics
    Index(index::IndexArgs),

    /// List corpus documents
    List(list::ListArgs),

    /// Show one parsed document
    Show(show::ShowArgs),

    /// Check the corpus for sparse documents and unsafe steps
    Doctor(doctor::DoctorArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Triage(args) => triage::run(ctx, args),
        Commands::Index(args) => index::run(ctx, args),
        Commands::List(args) => list::run(ctx, args),
        Commands::Show(args) => show::run(ctx, args),
        Commands::Doctor(args) => doctor::run(ctx, args),
        Commands::Completions(args) => {
            completions::run(args);
            Ok(())
        }
    }
}
