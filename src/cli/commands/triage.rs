//! kt triage - match a failure description against the corpus

use std::io::Read;

use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::compose::{ComposedResponse, Confidence, RemediationHit};
use crate::engine::{match_query, match_query_bytes};
use crate::error::{KtError, Result};
use crate::utils::{format_score, truncate_string};

#[derive(Args, Debug)]
pub struct TriageArgs {
    /// Error message, event text or log excerpt
    pub text: Vec<String>,

    /// Read the query from stdin instead
    #[arg(long, conflicts_with = "text")]
    pub stdin: bool,

    /// Maximum number of hits to report
    #[arg(long, short = 'k')]
    pub top_k: Option<usize>,

    /// Minimum score a hit needs to be reported
    #[arg(long)]
    pub min_score: Option<f64>,
}

#[derive(Serialize)]
struct TriageReport<'a> {
    snapshot_version: u64,
    fingerprint: &'a str,
    #[serde(flatten)]
    response: &'a ComposedResponse,
}

pub fn run(ctx: &AppContext, args: &TriageArgs) -> Result<()> {
    let mut options = ctx.response.clone();
    if let Some(top_k) = args.top_k {
        if top_k == 0 {
            return Err(KtError::Config("--top-k must be at least 1".to_string()));
        }
        options.top_k = top_k;
    }
    if let Some(min_score) = args.min_score {
        options.min_score = min_score;
    }

    let snapshot = ctx.store().current();
    let response = if args.stdin {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        match_query_bytes(&bytes, &snapshot, &options)
    } else {
        match_query(&args.text.join(" "), &snapshot, &options)
    };
    debug!(target: "triage", status = response.status(), version = snapshot.version());

    if ctx.robot_mode {
        return emit_robot(&robot_ok(TriageReport {
            snapshot_version: snapshot.version(),
            fingerprint: snapshot.short_fingerprint(),
            response: &response,
        }));
    }

    emit_human(&render(&response));
    Ok(())
}

fn render(response: &ComposedResponse) -> HumanLayout {
    let mut layout = HumanLayout::new();
    match response {
        ComposedResponse::Matched {
            confidence,
            needs_review,
            query_truncated,
            hints,
            hits,
            ..
        } => {
            layout.title(&format!("{} ({} confidence)", "Matched".green().bold(), paint(*confidence)));
            if !hints.reasons.is_empty() {
                layout.kv("reasons", &hints.reasons.join(", "));
            }
            if !hints.exit_codes.is_empty() {
                let codes: Vec<String> = hints.exit_codes.iter().map(u16::to_string).collect();
                layout.kv("exit codes", &codes.join(", "));
            }
            if *query_truncated {
                layout.kv("query", "truncated");
            }
            for (rank, hit) in hits.iter().enumerate() {
                layout.blank();
                render_hit(&mut layout, rank + 1, hit);
            }
            if *needs_review {
                layout.blank();
                layout.push_line(
                    "Some suggested steps were withheld as destructive; review them before acting."
                        .yellow()
                        .to_string(),
                );
            }
        }
        ComposedResponse::NoMatch {
            query_terms,
            best_score,
            info_requests,
            ..
        } => {
            layout.title(&"No matching runbook".yellow().bold().to_string());
            layout.kv("terms", &truncate_string(&query_terms.join(" "), 80));
            if let Some(score) = best_score {
                layout.kv("best score", &format_score(*score));
            }
            layout.blank();
            layout.section("Gather more evidence");
            for request in info_requests {
                layout.bullet(&format!("{}: {}", request.title, request.command));
            }
        }
    }
    layout
}

fn render_hit(layout: &mut HumanLayout, rank: usize, hit: &RemediationHit) {
    layout.section(&format!("{rank}. {}", hit.title));
    layout.kv("document", &hit.document_id.to_string());
    layout.kv("score", &format_score(hit.score));
    if !hit.signals.is_empty() {
        layout.kv("signals", &hit.signals.join(", "));
    }
    for (label, steps) in [
        ("Root causes", &hit.root_causes),
        ("Verify", &hit.verify_steps),
        ("Fix", &hit.fix_steps),
    ] {
        if steps.is_empty() {
            continue;
        }
        layout.push_line(label.bold().to_string());
        for step in steps {
            layout.bullet(step);
        }
    }
    for withheld in &hit.withheld_steps {
        layout.bullet(&format!(
            "{} {} ({})",
            "[withheld]".red(),
            withheld.step,
            withheld.reason
        ));
    }
}

fn paint(confidence: Confidence) -> String {
    match confidence {
        Confidence::High => confidence.as_str().green().to_string(),
        Confidence::Medium => confidence.as_str().yellow().to_string(),
        Confidence::Low => confidence.as_str().red().to_string(),
    }
}
