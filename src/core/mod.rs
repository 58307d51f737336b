//! Cross-cutting policy shared by the composer and the CLI.

pub mod safety;

pub use safety::{CommandDecision, CommandGuard, SafetyTier};
