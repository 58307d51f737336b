use std::sync::LazyLock;

use proptest::prelude::*;

use kt::compose::ResponseOptions;
use kt::corpus::{BUNDLED_CORPUS, DEFAULT_SEPARATOR};
use kt::engine::match_query_bytes;
use kt::search::{IndexOptions, IndexSnapshot, Query, match_snapshot};
use kt::{load_corpus, match_query};

static BUNDLED: LazyLock<IndexSnapshot> = LazyLock::new(|| {
    load_corpus(BUNDLED_CORPUS, DEFAULT_SEPARATOR, &IndexOptions::default()).unwrap()
});

const VOCABULARY: &[&str] = &[
    "oomkilled", "memory", "limit", "image", "pull", "crash", "restart", "dns", "probe",
    "readiness", "pending", "scheduling", "volume", "mount", "evicted", "disk", "node",
    "secret", "configmap", "architecture", "exit", "code", "137", "backoff",
];

fn vocabulary_query() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCABULARY), 1..6).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn adding_a_term_never_lowers_a_score(
        base in vocabulary_query(),
        extra in prop::sample::select(VOCABULARY),
    ) {
        let before = match_snapshot(&Query::parse(&base), &BUNDLED);
        let after = match_snapshot(&Query::parse(&format!("{base} {extra}")), &BUNDLED);
        for result in &before {
            let later = after.iter().find(|r| r.document_id == result.document_id);
            prop_assert!(later.is_some_and(|r| r.score >= result.score));
        }
    }

    #[test]
    fn matching_is_deterministic(query in "[a-zA-Z0-9 :./-]{0,80}") {
        let first = match_snapshot(&Query::parse(&query), &BUNDLED);
        let second = match_snapshot(&Query::parse(&query), &BUNDLED);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn results_are_positive_and_ordered(query in vocabulary_query()) {
        let results = match_snapshot(&Query::parse(&query), &BUNDLED);
        prop_assert!(results.iter().all(|r| r.score > 0.0));
        for pair in results.windows(2) {
            prop_assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].document_id < pair[1].document_id)
            );
        }
    }

    #[test]
    fn hits_respect_top_k_and_threshold(query in vocabulary_query(), top_k in 1usize..5) {
        let options = ResponseOptions { top_k, ..ResponseOptions::default() };
        let response = match_query(&query, &BUNDLED, &options);
        prop_assert!(response.hits().len() <= top_k);
        prop_assert!(response.hits().iter().all(|hit| hit.score >= options.min_score));
    }

    #[test]
    fn unknown_words_never_match(word in "zq[xj]{6,12}") {
        let response = match_query(&word, &BUNDLED, &ResponseOptions::default());
        prop_assert!(!response.is_match());
    }

    #[test]
    fn match_never_panics(input in ".*") {
        let _ = match_query(&input, &BUNDLED, &ResponseOptions::default());
    }

    #[test]
    fn match_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..2000)) {
        let _ = match_query_bytes(&bytes, &BUNDLED, &ResponseOptions::default());
    }
}
