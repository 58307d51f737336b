//! Corpus ingestion: loading, splitting and parsing troubleshooting documents.

pub mod document;
pub mod loader;
pub mod parser;

use std::path::PathBuf;

use rayon::prelude::*;
use tracing::debug;

pub use document::{DocId, Document};
pub use loader::{BUNDLED_CORPUS, DEFAULT_SEPARATOR, discover_files, load_segments, split_corpus};
pub use parser::{ParseState, parse_document};

use crate::error::Result;

/// Where a corpus comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSource {
    /// The corpus compiled into the binary.
    Bundled,
    /// In-memory text.
    Text(String),
    /// Files and directories, read in order.
    Paths(Vec<PathBuf>),
}

impl CorpusSource {
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        if paths.is_empty() {
            Self::Bundled
        } else {
            Self::Paths(paths)
        }
    }

    /// Produce the raw document segments of this source.
    pub fn segments(&self, separator: &str, extensions: &[String]) -> Result<Vec<String>> {
        match self {
            Self::Bundled => Ok(split_corpus(BUNDLED_CORPUS, separator)?
                .into_iter()
                .map(str::to_string)
                .collect()),
            Self::Text(text) => Ok(split_corpus(text, separator)?
                .into_iter()
                .map(str::to_string)
                .collect()),
            Self::Paths(paths) => load_segments(paths, separator, extensions),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Bundled => "bundled corpus".to_string(),
            Self::Text(_) => "in-memory corpus".to_string(),
            Self::Paths(paths) => paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Parse segments into documents, assigning ids in corpus order.
#[allow(clippy::cast_possible_truncation)]
pub fn parse_segments<S>(segments: &[S]) -> Vec<Document>
where
    S: AsRef<str> + Sync,
{
    let documents: Vec<Document> = segments
        .par_iter()
        .enumerate()
        .map(|(idx, raw)| parse_document(idx as DocId, raw.as_ref()))
        .collect();

    let sparse = documents.iter().filter(|doc| doc.is_sparse()).count();
    debug!(documents = documents.len(), sparse, "parsed corpus segments");
    documents
}
