//! Error types for kt

use thiserror::Error;

use crate::corpus::DocId;

#[derive(Error, Debug)]
pub enum KtError {
    #[error("corpus is empty: no documents remain after splitting on the separator")]
    EmptyCorpus,

    #[error("invalid separator: {0}")]
    InvalidSeparator(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("document not found: {0}")]
    DocumentNotFound(DocId),

    #[error("background build failed: {0}")]
    WorkerFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl KtError {
    /// Stable machine-readable code used by robot output.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyCorpus => "empty_corpus",
            Self::InvalidSeparator(_) => "invalid_separator",
            Self::Config(_) => "config",
            Self::MissingConfig(_) => "missing_config",
            Self::DocumentNotFound(_) => "document_not_found",
            Self::WorkerFailed(_) => "worker_failed",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::TomlParse(_) => "toml_parse",
        }
    }
}

pub type Result<T> = std::result::Result<T, KtError>;
