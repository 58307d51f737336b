use std::fs;
use std::path::PathBuf;

use kt::config::Config;
use kt::corpus::CorpusSource;
use kt::test_utils::{TestCase, run_table_tests};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn load_fixture(relative: &str) -> Config {
    let content = fs::read_to_string(fixture_path(relative)).expect("read fixture");
    Config::from_toml_str(&content).expect("parse config")
}

#[test]
fn config_response_and_weights_from_fixture() -> Result<(), String> {
    let cases = vec![
        TestCase::new(
            "default",
            "tests/fixtures/configs/default.toml",
            (3usize, 3.0f64, 3.0f64, 0.25f64, 14_000usize),
        ),
        TestCase::new(
            "custom",
            "tests/fixtures/configs/custom.toml",
            (5usize, 2.5f64, 4.0f64, 0.0f64, 2_000usize),
        ),
    ];

    run_table_tests(cases, |relative_path| {
        let config = load_fixture(relative_path);
        (
            config.response.top_k,
            config.response.min_score,
            config.index.symptom_weight,
            config.index.body_weight,
            config.matcher.max_query_chars,
        )
    })?;
    Ok(())
}

#[test]
fn custom_fixture_corpus_section() {
    let config = load_fixture("tests/fixtures/configs/custom.toml");
    // Repeated paths are merged once.
    assert_eq!(config.corpus.paths, vec!["/srv/kb"]);
    assert_eq!(config.corpus.separator, "=====DOC=====");
    assert_eq!(config.corpus.extensions, vec!["md"]);
    assert_eq!(
        config.corpus_source(),
        CorpusSource::Paths(vec![PathBuf::from("/srv/kb")])
    );
}

#[test]
fn custom_fixture_signals_and_safety() {
    let config = load_fixture("tests/fixtures/configs/custom.toml");
    let signals = config.index_options().signals;
    assert!(
        signals
            .rules()
            .iter()
            .any(|rule| rule.phrase.starts_with("x509"))
    );
    let options = config.response_options().expect("guard compiles");
    let guard = options.guard.expect("safety enabled");
    assert!(guard.is_dangerous("kubectl drain node-1 --ignore-daemonsets"));
}

#[test]
fn invalid_toml_is_rejected() {
    assert!(Config::from_toml_str("[response\ntop_k = 1").is_err());
    assert!(Config::from_toml_str("[response]\ntop_k = \"three\"").is_err());
}

#[test]
fn zero_top_k_fails_validation() {
    assert!(Config::from_toml_str("[response]\ntop_k = 0").is_err());
}

#[test]
fn zero_max_query_chars_fails_validation() {
    let err = Config::from_toml_str("[matcher]\nmax_query_chars = 0").unwrap_err();
    assert!(err.to_string().contains("max_query_chars"));
    assert!(Config::from_toml_str("[matcher]\nmax_query_chars = 1").is_ok());
}
