//! kt index - Build the index from the configured corpus

use std::time::Instant;

use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::search::{IndexSnapshot, IndexStats};

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Rebuild once more on a background worker and publish the result
    #[arg(long)]
    pub rebuild: bool,

    /// Print per-field posting counts
    #[arg(long)]
    pub fields: bool,
}

#[derive(Serialize)]
struct IndexReport {
    source: String,
    snapshot_version: u64,
    published_at: DateTime<Utc>,
    elapsed_ms: u64,
    #[serde(flatten)]
    stats: IndexStats,
}

pub fn run(ctx: &AppContext, args: &IndexArgs) -> Result<()> {
    let started = Instant::now();
    if args.rebuild {
        ctx.rebuild()?;
    }
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let snapshot = ctx.store().current();
    let report = IndexReport {
        source: ctx.source.describe(),
        snapshot_version: snapshot.version(),
        published_at: snapshot.published_at(),
        elapsed_ms,
        stats: snapshot.stats(),
    };

    if ctx.robot_mode {
        let warnings = sparse_warnings(&snapshot);
        return emit_robot(&robot_ok(report).with_warnings(warnings));
    }

    let mut layout = HumanLayout::new();
    layout
        .title(&format!("{} index built", "✓".green()))
        .kv("source", &report.source)
        .kv("version", &report.snapshot_version.to_string())
        .kv("published", &report.published_at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .kv("documents", &report.stats.documents.to_string())
        .kv("sparse", &report.stats.sparse_documents.to_string())
        .kv("terms", &report.stats.terms.to_string())
        .kv("postings", &report.stats.postings.to_string())
        .kv("signals", &report.stats.signal_rules.to_string())
        .kv("fingerprint", snapshot.short_fingerprint());
    if args.rebuild {
        layout.kv("rebuild", &format!("{} ms", report.elapsed_ms));
    }
    if args.fields {
        layout.blank().section("Postings by field");
        for (field, count) in &report.stats.postings_by_field {
            layout.kv(field.as_str(), &count.to_string());
        }
    }
    emit_human(&layout);
    Ok(())
}

/// One warning per document that contributes only its raw body to the index.
fn sparse_warnings(snapshot: &IndexSnapshot) -> Vec<String> {
    snapshot
        .documents()
        .filter(|doc| doc.is_sparse())
        .map(|doc| format!("document {} has no structured sections", doc.id))
        .collect()
}
