use proptest::prelude::*;

use kt::KtError;
use kt::corpus::{DEFAULT_SEPARATOR, parse_document, split_corpus};
use kt::load_corpus;
use kt::search::IndexOptions;

fn documents() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z][a-zA-Z0-9 :.-]{0,40}", 1..12)
}

proptest! {
    #[test]
    fn split_yields_one_segment_per_document(docs in documents(), pad in "[ \n\t]{0,3}") {
        let joined = docs.join(&format!("{pad}{DEFAULT_SEPARATOR}{pad}"));
        let segments = split_corpus(&joined, DEFAULT_SEPARATOR).unwrap();
        prop_assert_eq!(segments.len(), docs.len());
        for (segment, doc) in segments.iter().zip(&docs) {
            prop_assert_eq!(*segment, doc.trim());
        }
    }

    #[test]
    fn separators_and_whitespace_alone_are_empty(count in 0usize..6, pad in "[ \n\t]{0,4}") {
        let text = format!("{pad}{}", format!("{DEFAULT_SEPARATOR}{pad}").repeat(count));
        let result = split_corpus(&text, DEFAULT_SEPARATOR);
        prop_assert!(matches!(result, Err(KtError::EmptyCorpus)));
    }

    #[test]
    fn parse_never_panics_and_keeps_raw_text(input in ".*") {
        let doc = parse_document(7, &input);
        prop_assert_eq!(doc.id, 7);
        prop_assert_eq!(doc.raw_text, input);
    }

    #[test]
    fn parse_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..1000)) {
        let input = String::from_utf8_lossy(&bytes);
        let _ = parse_document(0, &input);
    }

    #[test]
    fn build_is_idempotent(docs in documents()) {
        let text = docs.join(DEFAULT_SEPARATOR);
        let first = load_corpus(&text, DEFAULT_SEPARATOR, &IndexOptions::default()).unwrap();
        let second = load_corpus(&text, DEFAULT_SEPARATOR, &IndexOptions::default()).unwrap();
        prop_assert_eq!(first.fingerprint(), second.fingerprint());
        prop_assert_eq!(first.len(), docs.len());
        prop_assert_eq!(first.posting_count(), second.posting_count());
    }
}
