//! kt list - List corpus documents

use clap::Args;
use serde::Serialize;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::corpus::{DocId, Document};
use crate::error::Result;
use crate::utils::truncate_string;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only documents with no structured sections
    #[arg(long)]
    pub sparse: bool,

    /// Maximum number of documents to show
    #[arg(long, short = 'n', default_value = "100")]
    pub limit: usize,

    /// Offset for pagination
    #[arg(long, default_value = "0")]
    pub offset: usize,
}

/// Serializable document summary
#[derive(Debug, Clone, Serialize)]
struct DocumentEntry {
    id: DocId,
    title: String,
    symptoms: usize,
    root_causes: usize,
    verify_steps: usize,
    fix_steps: usize,
    missing: Vec<&'static str>,
}

impl From<&Document> for DocumentEntry {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            title: doc.display_title(),
            symptoms: doc.symptoms.len(),
            root_causes: doc.root_causes.len(),
            verify_steps: doc.verify_steps.len(),
            fix_steps: doc.fix_steps.len(),
            missing: doc.missing_sections(),
        }
    }
}

pub fn run(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let snapshot = ctx.store().current();
    let entries: Vec<DocumentEntry> = snapshot
        .documents()
        .filter(|doc| !args.sparse || doc.is_sparse())
        .skip(args.offset)
        .take(args.limit)
        .map(DocumentEntry::from)
        .collect();
    debug!(target: "list", count = entries.len(), sparse_only = args.sparse, "listing documents");

    if ctx.robot_mode {
        return emit_robot(&robot_ok(entries));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("{} documents", entries.len()));
    for entry in &entries {
        let counts = format!(
            "S{} R{} V{} F{}",
            entry.symptoms, entry.root_causes, entry.verify_steps, entry.fix_steps
        );
        layout.push_line(format!(
            "{:>4}  {:<14} {}",
            entry.id,
            counts,
            truncate_string(&entry.title, 72)
        ));
    }
    emit_human(&layout);
    Ok(())
}
