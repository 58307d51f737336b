//! Query matching against an index snapshot.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};

use super::index::IndexSnapshot;
use super::signals::QueryHints;
use super::tokenize::{phrase_text, tokenize};
use crate::corpus::DocId;
use crate::utils::truncate_chars;

/// A free-text query with the hints extracted from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// Query text actually matched (after truncation).
    pub text: String,
    /// Distinct normalized terms in order of first appearance.
    pub terms: Vec<String>,
    pub hints: QueryHints,
    /// Whether the input was cut to the configured maximum length.
    pub truncated: bool,
    #[serde(skip)]
    signal_text: String,
}

impl Query {
    /// Parse a query without a length limit.
    pub fn parse(text: &str) -> Self {
        Self::parse_with_limit(text, usize::MAX)
    }

    /// Parse a query, keeping at most `max_chars` characters of input.
    pub fn parse_with_limit(text: &str, max_chars: usize) -> Self {
        let (text, truncated) = truncate_chars(text, max_chars);
        if truncated {
            debug!(max_chars, "query truncated");
        }

        let mut terms: Vec<String> = Vec::new();
        let mut seen = BTreeSet::new();
        for token in tokenize(text) {
            if seen.insert(token.clone()) {
                terms.push(token);
            }
        }

        let hints = QueryHints::extract(text);
        let mut signal_text = phrase_text(text);
        for phrase in hints.canonical_phrases() {
            signal_text.push_str(&phrase);
            signal_text.push(' ');
        }

        Self {
            text: text.to_string(),
            terms,
            hints,
            truncated,
            signal_text,
        }
    }

    /// Parse raw query bytes. Undecodable input degrades to an empty query.
    pub fn from_bytes(bytes: &[u8], max_chars: usize) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::parse_with_limit(text, max_chars),
            Err(err) => {
                warn!(error = %err, "query is not valid UTF-8, treating it as empty");
                Self::parse("")
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.hints.is_empty()
    }

    /// Normalized phrase text used for signal matching.
    pub fn signal_text(&self) -> &str {
        &self.signal_text
    }
}

/// One ranked candidate document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub document_id: DocId,
    pub score: f64,
    pub matched_terms: BTreeSet<String>,
    /// Signal phrases that contributed a bonus.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<String>,
}

#[derive(Debug, Default)]
struct Accumulator {
    score: f64,
    terms: BTreeSet<String>,
    signals: Vec<String>,
}

/// Score `query` against `snapshot`.
///
/// Results are sorted by descending score, ties broken by ascending document
/// id. Documents with no accumulated score are never returned.
pub fn match_snapshot(query: &Query, snapshot: &IndexSnapshot) -> Vec<MatchResult> {
    let mut scores: BTreeMap<DocId, Accumulator> = BTreeMap::new();

    for term in &query.terms {
        for posting in snapshot.postings(term) {
            let acc = scores.entry(posting.document_id).or_default();
            acc.score += posting.weight;
            acc.terms.insert(term.clone());
        }
    }

    let table = snapshot.signals();
    for rule_idx in table.matching(query.signal_text()) {
        let rule = &table.rules()[rule_idx];
        for document_id in snapshot.signal_documents(rule_idx) {
            let acc = scores.entry(*document_id).or_default();
            acc.score += rule.bonus;
            acc.signals.push(rule.phrase.clone());
        }
    }

    let mut results: Vec<MatchResult> = scores
        .into_iter()
        .filter(|(_, acc)| acc.score > 0.0)
        .map(|(document_id, acc)| MatchResult {
            document_id,
            score: acc.score,
            matched_terms: acc.terms,
            signals: acc.signals,
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.document_id.cmp(&b.document_id))
    });

    debug!(
        terms = query.terms.len(),
        candidates = results.len(),
        top = results.first().map(|r| r.document_id),
        "matched query"
    );
    results
}
