//! Corpus loading: separator splitting and file discovery.
//!
//! Splitting is an exact byte-sequence match on the separator token. A token
//! that happens to occur inside a document's prose is indistinguishable from
//! a real separator, so the token has to be chosen so it cannot collide with
//! authored content (the bundled corpus uses a long random-suffixed token).

use std::path::{Path, PathBuf};

use memchr::memmem;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{KtError, Result};

/// Separator token used by the bundled corpus.
pub const DEFAULT_SEPARATOR: &str = "<<<KT_DOC_SEPARATOR_7f3a9c2e41b8d605>>>";

/// Corpus compiled into the binary, used when no corpus path is configured.
pub const BUNDLED_CORPUS: &str = include_str!("../../data/corpus/k8s_troubleshooting.txt");

/// Split a corpus blob into trimmed, non-empty document segments.
///
/// Fails with [`KtError::EmptyCorpus`] when no segment survives.
pub fn split_corpus<'a>(text: &'a str, separator: &str) -> Result<Vec<&'a str>> {
    let segments = split_segments(text, separator)?;
    if segments.is_empty() {
        return Err(KtError::EmptyCorpus);
    }
    Ok(segments)
}

/// Like [`split_corpus`] but an empty result is not an error.
fn split_segments<'a>(text: &'a str, separator: &str) -> Result<Vec<&'a str>> {
    if separator.is_empty() {
        return Err(KtError::InvalidSeparator(
            "separator token must not be empty".to_string(),
        ));
    }

    let mut segments = Vec::new();
    let mut start = 0;
    // Matches are non-overlapping and start on char boundaries because both
    // haystack and needle are valid UTF-8.
    for pos in memmem::find_iter(text.as_bytes(), separator.as_bytes()) {
        push_segment(&text[start..pos], &mut segments);
        start = pos + separator.len();
    }
    push_segment(&text[start..], &mut segments);

    Ok(segments)
}

fn push_segment<'a>(segment: &'a str, out: &mut Vec<&'a str>) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        out.push(trimmed);
    }
}

/// Read document segments from files and directories, in order.
///
/// Directories are walked recursively in sorted path order and only files
/// whose extension is listed in `extensions` are read. Each file may hold
/// several separator-delimited documents. Missing paths are skipped with a
/// warning; the combined result must still contain at least one document.
pub fn load_segments(paths: &[PathBuf], separator: &str, extensions: &[String]) -> Result<Vec<String>> {
    let mut segments = Vec::new();

    for path in paths {
        if path.is_dir() {
            for file in discover_files(path, extensions) {
                read_file_segments(&file, separator, &mut segments)?;
            }
        } else if path.is_file() {
            read_file_segments(path, separator, &mut segments)?;
        } else {
            warn!(path = %path.display(), "corpus path not found, skipping");
        }
    }

    if segments.is_empty() {
        return Err(KtError::EmptyCorpus);
    }
    Ok(segments)
}

/// Files below `dir` with a matching extension, sorted by path.
pub fn discover_files(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable corpus entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| has_extension(path, extensions))
        .collect();
    files.sort();
    files
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

fn read_file_segments(path: &Path, separator: &str, out: &mut Vec<String>) -> Result<()> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read corpus file, skipping");
            return Ok(());
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    let before = out.len();
    out.extend(
        split_segments(&text, separator)?
            .into_iter()
            .map(str::to_string),
    );
    debug!(
        path = %path.display(),
        documents = out.len() - before,
        "read corpus file"
    );
    Ok(())
}
