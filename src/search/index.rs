//! Inverted index with per-field weighted postings.
//!
//! An [`IndexSnapshot`] is built once from a document set and never mutated
//! afterwards. Every (term, document, field) triple accumulates the field's
//! weight once per occurrence; postings for a term are kept sorted by
//! descending weight so callers can read the strongest evidence first.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use super::signals::SignalTable;
use super::tokenize::{phrase_text, tokenize};
use crate::corpus::{DocId, Document};

/// Document field a posting was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Symptoms,
    RootCause,
    Verify,
    Fix,
    Body,
}

impl Field {
    pub const ALL: [Self; 6] = [
        Self::Title,
        Self::Symptoms,
        Self::RootCause,
        Self::Verify,
        Self::Fix,
        Self::Body,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Symptoms => "symptoms",
            Self::RootCause => "root_cause",
            Self::Verify => "verify",
            Self::Fix => "fix",
            Self::Body => "body",
        }
    }

    fn texts(self, doc: &Document) -> Vec<&str> {
        match self {
            Self::Title => vec![doc.title.as_str()],
            Self::Symptoms => doc.symptoms.iter().map(String::as_str).collect(),
            Self::RootCause => doc.root_causes.iter().map(String::as_str).collect(),
            Self::Verify => doc.verify_steps.iter().map(String::as_str).collect(),
            Self::Fix => doc.fix_steps.iter().map(String::as_str).collect(),
            Self::Body => vec![doc.raw_text.as_str()],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field weight multipliers.
///
/// Symptoms weigh most because they are what a user describes when reporting
/// an incident; the raw body weighs least. The defaults are multiples of 0.25
/// so score sums are exact in `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldWeights {
    pub title: f64,
    pub symptoms: f64,
    pub root_cause: f64,
    pub verify: f64,
    pub fix: f64,
    pub body: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 2.5,
            symptoms: 3.0,
            root_cause: 1.5,
            verify: 1.0,
            fix: 1.0,
            body: 0.25,
        }
    }
}

impl FieldWeights {
    pub const fn weight(&self, field: Field) -> f64 {
        match field {
            Field::Title => self.title,
            Field::Symptoms => self.symptoms,
            Field::RootCause => self.root_cause,
            Field::Verify => self.verify,
            Field::Fix => self.fix,
            Field::Body => self.body,
        }
    }
}

/// Build-time options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexOptions {
    pub weights: FieldWeights,
    pub signals: SignalTable,
}

/// Where and how strongly a term occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub document_id: DocId,
    pub field: Field,
    pub weight: f64,
}

/// Summary numbers for an index snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: usize,
    pub terms: usize,
    pub postings: usize,
    pub sparse_documents: usize,
    pub signal_rules: usize,
    pub postings_by_field: BTreeMap<Field, usize>,
    pub fingerprint: String,
}

/// Immutable, fully built index plus its document set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSnapshot {
    postings: BTreeMap<String, Vec<Posting>>,
    documents: BTreeMap<DocId, Document>,
    signals: SignalTable,
    /// Documents containing each signal phrase, parallel to `signals.rules()`.
    signal_documents: Vec<Vec<DocId>>,
    weights: FieldWeights,
    fingerprint: String,
}

type DocTerms = BTreeMap<(String, Field), f64>;

impl IndexSnapshot {
    /// Snapshot with no documents.
    pub fn empty() -> Self {
        Self::build(Vec::new(), &IndexOptions::default())
    }

    /// Build a snapshot from parsed documents.
    pub fn build(documents: Vec<Document>, options: &IndexOptions) -> Self {
        let per_doc: Vec<(DocId, DocTerms, Vec<usize>)> = documents
            .par_iter()
            .map(|doc| {
                let terms = document_terms(doc, &options.weights);
                let signals = options.signals.matching(&phrase_text(&doc.raw_text));
                (doc.id, terms, signals)
            })
            .collect();

        let mut postings: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
        let mut signal_documents = vec![Vec::new(); options.signals.len()];
        for (document_id, terms, signals) in per_doc {
            for ((term, field), weight) in terms {
                postings.entry(term).or_default().push(Posting {
                    document_id,
                    field,
                    weight,
                });
            }
            for rule in signals {
                signal_documents[rule].push(document_id);
            }
        }

        for list in postings.values_mut() {
            list.sort_by(|a, b| {
                b.weight
                    .total_cmp(&a.weight)
                    .then_with(|| a.document_id.cmp(&b.document_id))
                    .then_with(|| a.field.cmp(&b.field))
            });
        }
        for docs in &mut signal_documents {
            docs.sort_unstable();
            docs.dedup();
        }

        let documents: BTreeMap<DocId, Document> =
            documents.into_iter().map(|doc| (doc.id, doc)).collect();

        let mut snapshot = Self {
            postings,
            documents,
            signals: options.signals.clone(),
            signal_documents,
            weights: options.weights,
            fingerprint: String::new(),
        };
        snapshot.fingerprint = snapshot.compute_fingerprint();

        info!(
            documents = snapshot.documents.len(),
            terms = snapshot.postings.len(),
            postings = snapshot.posting_count(),
            fingerprint = %snapshot.short_fingerprint(),
            "built index snapshot"
        );
        snapshot
    }

    /// Postings for a normalized term, strongest first.
    pub fn postings(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map_or(&[], Vec::as_slice)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// Documents in id order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn posting_count(&self) -> usize {
        self.postings.values().map(Vec::len).sum()
    }

    pub const fn signals(&self) -> &SignalTable {
        &self.signals
    }

    /// Documents containing the phrase of signal rule `rule`.
    pub fn signal_documents(&self, rule: usize) -> &[DocId] {
        self.signal_documents.get(rule).map_or(&[], Vec::as_slice)
    }

    pub const fn weights(&self) -> &FieldWeights {
        &self.weights
    }

    /// SHA-256 (hex) over postings, documents and signal table.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn short_fingerprint(&self) -> &str {
        self.fingerprint.get(..12).unwrap_or(&self.fingerprint)
    }

    pub fn stats(&self) -> IndexStats {
        let mut postings_by_field = BTreeMap::new();
        for posting in self.postings.values().flatten() {
            *postings_by_field.entry(posting.field).or_insert(0) += 1;
        }
        IndexStats {
            documents: self.documents.len(),
            terms: self.postings.len(),
            postings: self.posting_count(),
            sparse_documents: self.documents.values().filter(|d| d.is_sparse()).count(),
            signal_rules: self.signals.len(),
            postings_by_field,
            fingerprint: self.fingerprint.clone(),
        }
    }

    fn compute_fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (term, list) in &self.postings {
            hasher.update(term.as_bytes());
            hasher.update([0u8]);
            for posting in list {
                hasher.update(posting.document_id.to_le_bytes());
                hasher.update(posting.field.as_str().as_bytes());
                hasher.update(posting.weight.to_bits().to_le_bytes());
            }
            hasher.update([0xffu8]);
        }
        for (id, doc) in &self.documents {
            hasher.update(id.to_le_bytes());
            hasher.update(doc.raw_text.as_bytes());
            hasher.update([0u8]);
        }
        for (rule, docs) in self.signals.rules().iter().zip(&self.signal_documents) {
            hasher.update(rule.phrase.as_bytes());
            hasher.update(rule.bonus.to_bits().to_le_bytes());
            for id in docs {
                hasher.update(id.to_le_bytes());
            }
        }
        hex::encode(hasher.finalize())
    }
}

/// Accumulate weighted term frequencies for one document.
fn document_terms(doc: &Document, weights: &FieldWeights) -> DocTerms {
    let mut terms = DocTerms::new();
    for field in Field::ALL {
        let weight = weights.weight(field);
        if weight <= 0.0 || weight.is_nan() {
            continue;
        }
        for text in field.texts(doc) {
            for token in tokenize(text) {
                *terms.entry((token, field)).or_insert(0.0) += weight;
            }
        }
    }
    terms
}
