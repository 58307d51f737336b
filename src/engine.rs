//! Build and query entry points.

use tracing::info;

use crate::compose::{ComposedResponse, ResponseOptions, compose};
use crate::corpus::{CorpusSource, parse_segments, split_corpus};
use crate::error::Result;
use crate::search::{IndexOptions, IndexSnapshot, Query, match_snapshot};

/// Split, parse and index an in-memory corpus.
///
/// Fails with `EmptyCorpus` when no document survives splitting.
pub fn load_corpus(text: &str, separator: &str, options: &IndexOptions) -> Result<IndexSnapshot> {
    let segments = split_corpus(text, separator)?;
    Ok(IndexSnapshot::build(parse_segments(&segments), options))
}

/// Build a snapshot from any corpus source.
pub fn build_snapshot(
    source: &CorpusSource,
    separator: &str,
    extensions: &[String],
    options: &IndexOptions,
) -> Result<IndexSnapshot> {
    let segments = source.segments(separator, extensions)?;
    info!(source = %source.describe(), segments = segments.len(), "loaded corpus");
    Ok(IndexSnapshot::build(parse_segments(&segments), options))
}

/// Match free text against `snapshot` and compose the response.
pub fn match_query(
    query_text: &str,
    snapshot: &IndexSnapshot,
    options: &ResponseOptions,
) -> ComposedResponse {
    let query = Query::parse_with_limit(query_text, options.max_query_chars);
    respond(&query, snapshot, options)
}

/// Like [`match_query`] for raw bytes; invalid UTF-8 yields a no-match.
pub fn match_query_bytes(
    query_bytes: &[u8],
    snapshot: &IndexSnapshot,
    options: &ResponseOptions,
) -> ComposedResponse {
    let query = Query::from_bytes(query_bytes, options.max_query_chars);
    respond(&query, snapshot, options)
}

fn respond(query: &Query, snapshot: &IndexSnapshot, options: &ResponseOptions) -> ComposedResponse {
    let results = match_snapshot(query, snapshot);
    compose(query, &results, snapshot, options)
}
