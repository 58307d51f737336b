use std::path::PathBuf;

use kt::KtError;
use kt::corpus::{BUNDLED_CORPUS, CorpusSource, DEFAULT_SEPARATOR, parse_segments, split_corpus};
use kt::test_utils::UnitTestFixture;

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn bundled_corpus_is_fully_structured() {
    let segments = split_corpus(BUNDLED_CORPUS, DEFAULT_SEPARATOR).unwrap();
    assert_eq!(segments.len(), 10);
    let docs = parse_segments(&segments);
    for doc in &docs {
        assert!(!doc.title.is_empty(), "document {} has no title", doc.id);
        assert!(doc.missing_sections().is_empty(), "document {}: {:?}", doc.id, doc.missing_sections());
    }
    assert!(docs[0].title.starts_with("OOMKilled"));
}

#[test]
fn fixture_corpus_with_custom_separator() {
    let source = CorpusSource::from_paths(vec![fixture_path("tests/fixtures/corpus")]);
    let segments = source.segments("=====DOC=====", &["md".to_string()]).unwrap();
    let docs = parse_segments(&segments);
    assert_eq!(docs.len(), 2);

    assert!(docs[0].title.starts_with("Certificate errors"));
    assert_eq!(docs[0].symptoms.len(), 2);
    assert_eq!(docs[0].root_causes.len(), 1);

    assert_eq!(docs[1].title, "Node NotReady");
    assert_eq!(docs[1].symptoms.len(), 2);
    assert_eq!(docs[1].fix_steps.len(), 2);
    assert!(docs[1].verify_steps.is_empty());
}

#[test]
fn wrong_separator_keeps_file_as_one_document() {
    let source = CorpusSource::from_paths(vec![fixture_path("tests/fixtures/corpus/runbooks.md")]);
    let segments = source.segments(DEFAULT_SEPARATOR, &[]).unwrap();
    assert_eq!(segments.len(), 1);
}

#[test]
fn directory_without_matching_files_is_empty() {
    let fixture = UnitTestFixture::new();
    fixture.create_file("notes.json", "{}");
    let source = CorpusSource::from_paths(vec![fixture.data_path.clone()]);
    let err = source.segments(DEFAULT_SEPARATOR, &["md".to_string()]).unwrap_err();
    assert!(matches!(err, KtError::EmptyCorpus));
}

#[test]
fn text_source_round_trips_raw_segments() {
    let text = format!("# A\nbody a\n{DEFAULT_SEPARATOR}\n# B\nbody b");
    let segments = CorpusSource::Text(text).segments(DEFAULT_SEPARATOR, &[]).unwrap();
    let docs = parse_segments(&segments);
    assert_eq!(docs[0].raw_text, "# A\nbody a");
    assert_eq!(docs[1].raw_text, "# B\nbody b");
}
