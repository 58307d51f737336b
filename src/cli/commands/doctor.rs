//! kt doctor - Corpus health checks

use std::collections::BTreeMap;

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::core::safety::{CommandGuard, SafetyTier};
use crate::corpus::{DocId, Document};
use crate::error::Result;
use crate::search::IndexSnapshot;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Also report documents that lack individual sections
    #[arg(long)]
    pub sections: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub document_id: Option<DocId>,
    pub check: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    documents: usize,
    findings: Vec<Finding>,
}

pub fn run(ctx: &AppContext, args: &DoctorArgs) -> Result<()> {
    let snapshot = ctx.store().current();
    // Lint with the configured guard even when screening is switched off.
    let guard = match &ctx.response.guard {
        Some(guard) => guard.clone(),
        None => CommandGuard::with_extra_patterns(&ctx.config.safety.extra_patterns)?,
    };
    let findings = check_corpus(&snapshot, &guard, args.sections);

    if ctx.robot_mode {
        return emit_robot(&robot_ok(DoctorReport {
            documents: snapshot.len(),
            findings,
        }));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("kt doctor: {} documents", snapshot.len()));
    if findings.is_empty() {
        layout.push_line(format!("{} no issues found", "✓".green()));
    }
    for finding in &findings {
        let tag = match finding.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warn".yellow().bold(),
            Severity::Info => "info".blue(),
        };
        let doc = finding
            .document_id
            .map_or_else(String::new, |id| format!("#{id} "));
        layout.push_line(format!("{tag:>5} {doc}[{}] {}", finding.check, finding.message));
    }
    emit_human(&layout);
    Ok(())
}

/// Run every corpus check and return findings, most severe first.
pub fn check_corpus(snapshot: &IndexSnapshot, guard: &CommandGuard, sections: bool) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut titles: BTreeMap<String, Vec<DocId>> = BTreeMap::new();

    for doc in snapshot.documents() {
        if !doc.title.is_empty() {
            titles
                .entry(doc.title.to_lowercase())
                .or_default()
                .push(doc.id);
        }
        check_document(doc, guard, sections, &mut findings);
    }

    for ids in titles.values().filter(|ids| ids.len() > 1) {
        let list: Vec<String> = ids.iter().map(ToString::to_string).collect();
        findings.push(Finding {
            severity: Severity::Warning,
            document_id: ids.first().copied(),
            check: "duplicate-title",
            message: format!("documents {} share a title", list.join(", ")),
        });
    }

    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.document_id.cmp(&b.document_id))
    });
    findings
}

fn check_document(doc: &Document, guard: &CommandGuard, sections: bool, findings: &mut Vec<Finding>) {
    if doc.is_sparse() {
        findings.push(Finding {
            severity: Severity::Warning,
            document_id: Some(doc.id),
            check: "sparse",
            message: "no structured sections; only the raw body is searchable".to_string(),
        });
    } else if sections {
        let missing = doc.missing_sections();
        if !missing.is_empty() {
            findings.push(Finding {
                severity: Severity::Info,
                document_id: Some(doc.id),
                check: "missing-sections",
                message: format!("missing {}", missing.join(", ")),
            });
        }
    }

    for step in doc.fix_steps.iter().chain(&doc.verify_steps) {
        let decision = guard.evaluate_command(step);
        if decision.allowed {
            continue;
        }
        let severity = if decision.tier >= SafetyTier::Critical {
            Severity::Error
        } else {
            Severity::Warning
        };
        findings.push(Finding {
            severity,
            document_id: Some(doc.id),
            check: "unsafe-step",
            message: format!("{}: {step}", decision.reason),
        });
    }
}
