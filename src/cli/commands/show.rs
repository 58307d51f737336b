//! kt show - Show one parsed document

use clap::Args;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::corpus::DocId;
use crate::error::{KtError, Result};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Document id (see `kt list`)
    pub id: DocId,

    /// Also print the raw document text
    #[arg(long)]
    pub raw: bool,
}

pub fn run(ctx: &AppContext, args: &ShowArgs) -> Result<()> {
    let snapshot = ctx.store().current();
    let doc = snapshot
        .document(args.id)
        .ok_or(KtError::DocumentNotFound(args.id))?;
    debug!(target: "show", id = doc.id, sparse = doc.is_sparse());

    if ctx.robot_mode {
        return emit_robot(&robot_ok(doc));
    }

    let mut layout = HumanLayout::new();
    layout.title(&doc.display_title());
    layout.kv("document", &doc.id.to_string());
    let missing = doc.missing_sections();
    if !missing.is_empty() {
        layout.kv("missing", &missing.join(", "));
    }
    for (label, items) in [
        ("Symptoms", &doc.symptoms),
        ("Root causes", &doc.root_causes),
        ("Verify", &doc.verify_steps),
        ("Fix", &doc.fix_steps),
    ] {
        if items.is_empty() {
            continue;
        }
        layout.blank().section(label);
        for item in items {
            layout.bullet(item);
        }
    }
    if args.raw {
        layout.blank().section("Raw text");
        layout.push_line(doc.raw_text.clone());
    }
    emit_human(&layout);
    Ok(())
}
