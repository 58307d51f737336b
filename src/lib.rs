//! kt - Kube Triage
//!
//! Loads a corpus of container-orchestration troubleshooting documents,
//! indexes it, and matches error messages or log excerpts against it to
//! produce remediation suggestions.

pub mod app;
pub mod cli;
pub mod compose;
pub mod config;
pub mod core;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod search;
pub mod utils;

pub mod test_utils;

pub use compose::{ComposedResponse, ResponseOptions};
pub use engine::{load_corpus, match_query};
pub use error::{KtError, Result};
pub use search::{IndexOptions, IndexSnapshot};
