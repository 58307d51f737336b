//! Criterion benchmarks for corpus indexing and query matching.
//!
//! Performance targets:
//! - Bundled corpus build: < 5ms
//! - Single query against the bundled snapshot: < 100us

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use kt::compose::ResponseOptions;
use kt::corpus::{BUNDLED_CORPUS, DEFAULT_SEPARATOR};
use kt::search::{IndexOptions, Query, match_snapshot};
use kt::{load_corpus, match_query};

const QUERIES: &[(&str, &str)] = &[
    ("oom", "Last State: Terminated Reason: OOMKilled Exit Code: 137"),
    ("image", "Failed to pull image \"registry.local/app:v2\": ErrImagePull"),
    ("dns", "dial tcp: lookup postgres.default.svc.cluster.local: no such host"),
    ("nonsense", "zzzqqqxyz lorem ipsum"),
];

// =============================================================================
// Index Benchmarks
// =============================================================================

fn index_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("index");
    group.throughput(Throughput::Bytes(BUNDLED_CORPUS.len() as u64));

    group.bench_function("build_bundled", |b| {
        let options = IndexOptions::default();
        b.iter(|| load_corpus(black_box(BUNDLED_CORPUS), DEFAULT_SEPARATOR, &options).unwrap());
    });

    // Same documents repeated to see how the build scales
    for copies in [4usize, 16] {
        let corpus = vec![BUNDLED_CORPUS; copies].join(DEFAULT_SEPARATOR);
        group.bench_with_input(BenchmarkId::new("build_repeated", copies), &corpus, |b, corpus| {
            let options = IndexOptions::default();
            b.iter(|| load_corpus(black_box(corpus), DEFAULT_SEPARATOR, &options).unwrap());
        });
    }

    group.finish();
}

// =============================================================================
// Match Benchmarks
// =============================================================================

fn match_benchmarks(c: &mut Criterion) {
    let snapshot = load_corpus(BUNDLED_CORPUS, DEFAULT_SEPARATOR, &IndexOptions::default()).unwrap();
    let options = ResponseOptions::default();
    let mut group = c.benchmark_group("match");

    for (name, query) in QUERIES {
        group.bench_with_input(BenchmarkId::new("score", name), query, |b, query| {
            b.iter(|| match_snapshot(&Query::parse(black_box(query)), &snapshot));
        });
        group.bench_with_input(BenchmarkId::new("compose", name), query, |b, query| {
            b.iter(|| match_query(black_box(query), &snapshot, &options));
        });
    }

    // Large log paste, truncated to the query limit
    let paste = "Warning BackOff kubelet Back-off restarting failed container\n".repeat(400);
    group.throughput(Throughput::Bytes(paste.len() as u64));
    group.bench_function("compose_large_paste", |b| {
        b.iter(|| match_query(black_box(&paste), &snapshot, &options));
    });

    group.finish();
}

criterion_group!(benches, index_benchmarks, match_benchmarks);
criterion_main!(benches);
