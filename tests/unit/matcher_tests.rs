use kt::compose::{ComposedResponse, Confidence, ResponseOptions};
use kt::corpus::{BUNDLED_CORPUS, DEFAULT_SEPARATOR, DocId};
use kt::search::{IndexOptions, IndexSnapshot, Query, match_snapshot};
use kt::test_utils::{TestCase, run_table_tests};
use kt::{load_corpus, match_query};

fn bundled() -> IndexSnapshot {
    load_corpus(BUNDLED_CORPUS, DEFAULT_SEPARATOR, &IndexOptions::default()).unwrap()
}

fn case(name: &'static str, input: &'static str, expected: DocId) -> TestCase<&'static str, Option<DocId>> {
    TestCase::new(name, input, Some(expected))
}

#[test]
fn common_failures_rank_their_runbook_first() -> Result<(), String> {
    let snapshot = bundled();
    let cases = vec![
        case("oom", "Last State: Terminated Reason: OOMKilled Exit Code: 137", 0),
        case("image pull", "Back-off pulling image \"registry/app:v2\": ErrImagePull", 1),
        case("crash loop", "CrashLoopBackOff", 2),
        case(
            "architecture",
            "standard_init_linux.go:228: exec user process caused: exec format error",
            3,
        ),
        case("scheduling", "0/3 nodes are available: 3 Insufficient cpu. FailedScheduling", 4),
        case("config", "Error: CreateContainerConfigError", 5),
        case("dns", "dial tcp: lookup db.default.svc: no such host", 6),
        case("readiness", "Readiness probe failed: HTTP probe failed with statuscode: 503", 7),
        case("evicted", "The node was low on resource: ephemeral-storage. Evicted", 8),
        case("volume", "Warning FailedMount MountVolume.SetUp failed for volume", 9),
    ];

    run_table_tests(cases, |query| {
        match_query(query, &snapshot, &ResponseOptions::default())
            .hits()
            .first()
            .map(|hit| hit.document_id)
    })?;
    Ok(())
}

#[test]
fn signal_hits_are_high_confidence() {
    let response = match_query("OOMKilled", &bundled(), &ResponseOptions::default());
    let ComposedResponse::Matched { confidence, hits, .. } = response else {
        panic!("expected a match");
    };
    assert_eq!(confidence, Confidence::High);
    assert!(hits.len() <= 3);
    assert!(hits[0].signals.contains(&"oomkilled".to_string()));
}

#[test]
fn evicted_runbook_withholds_destructive_step() {
    let response = match_query("Evicted DiskPressure", &bundled(), &ResponseOptions::default());
    let ComposedResponse::Matched {
        needs_review, hits, ..
    } = response
    else {
        panic!("expected a match");
    };
    assert!(needs_review);
    let evicted = &hits[0];
    assert_eq!(evicted.document_id, 8);
    assert!(evicted.fix_steps.iter().all(|step| !step.contains("rm -rf")));
    assert!(evicted.withheld_steps.iter().any(|w| w.step.contains("rm -rf")));
}

#[test]
fn nonsense_is_explicit_no_match() {
    let response = match_query("zzzqqqxyz", &bundled(), &ResponseOptions::default());
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "no_match");
    assert_eq!(json["query_terms"][0], "zzzqqqxyz");
    assert!(json["best_score"].is_null());
    assert!(
        json["info_requests"]
            .as_array()
            .unwrap()
            .iter()
            .any(|r| r["command"].as_str().unwrap().contains("--previous"))
    );
}

#[test]
fn ranking_is_sorted_and_positive() {
    let snapshot = bundled();
    let results = match_snapshot(&Query::parse("pod pending node events kubectl"), &snapshot);
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.score > 0.0));
    for pair in results.windows(2) {
        assert!(
            pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].document_id < pair[1].document_id)
        );
    }
}

#[test]
fn threshold_and_top_k_are_respected() {
    let snapshot = bundled();
    let options = ResponseOptions {
        top_k: 2,
        min_score: 0.0,
        ..ResponseOptions::default()
    };
    let response = match_query("kubectl describe pod", &snapshot, &options);
    assert_eq!(response.hits().len(), 2);

    let strict = ResponseOptions {
        min_score: 1_000.0,
        ..ResponseOptions::default()
    };
    let response = match_query("OOMKilled", &snapshot, &strict);
    let ComposedResponse::NoMatch { best_score, .. } = response else {
        panic!("expected no match above an unreachable threshold");
    };
    assert!(best_score.unwrap() > 0.0);
}
