//! Indexing and matching.
//!
//! Documents are tokenized into a weighted inverted index ([`IndexSnapshot`]),
//! queries are scored against a snapshot ([`match_snapshot`]), and snapshots
//! are published atomically through a [`SnapshotStore`].

pub mod index;
pub mod matcher;
pub mod signals;
pub mod snapshot;
pub mod tokenize;

pub use index::{Field, FieldWeights, IndexOptions, IndexSnapshot, IndexStats, Posting};
pub use matcher::{MatchResult, Query, match_snapshot};
pub use signals::{QueryHints, SignalRule, SignalTable};
pub use snapshot::{PublishedSnapshot, SnapshotStore, join_rebuild};
pub use tokenize::{phrase_text, tokenize};
