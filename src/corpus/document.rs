//! Parsed troubleshooting document

use serde::{Deserialize, Serialize};

/// Stable document identifier. Assignment order is corpus order.
pub type DocId = u32;

/// A single troubleshooting document.
///
/// Structured fields are never null; a document the parser could not make
/// sense of simply has empty sequences and keeps everything in `raw_text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub root_causes: Vec<String>,
    #[serde(default)]
    pub verify_steps: Vec<String>,
    #[serde(default)]
    pub fix_steps: Vec<String>,
    pub raw_text: String,
}

impl Document {
    /// Create a document with no structured fields.
    pub fn unstructured(id: DocId, raw_text: impl Into<String>) -> Self {
        Self {
            id,
            raw_text: raw_text.into(),
            ..Default::default()
        }
    }

    /// True when the parser recovered no structured section at all.
    pub fn is_sparse(&self) -> bool {
        self.symptoms.is_empty()
            && self.root_causes.is_empty()
            && self.verify_steps.is_empty()
            && self.fix_steps.is_empty()
    }

    /// Names of the structured sections that came out empty.
    pub fn missing_sections(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_empty() {
            missing.push("title");
        }
        if self.symptoms.is_empty() {
            missing.push("symptoms");
        }
        if self.root_causes.is_empty() {
            missing.push("root_causes");
        }
        if self.verify_steps.is_empty() {
            missing.push("verify_steps");
        }
        if self.fix_steps.is_empty() {
            missing.push("fix_steps");
        }
        missing
    }

    /// Title for display, falling back to a placeholder for untitled documents.
    pub fn display_title(&self) -> String {
        if self.title.is_empty() {
            format!("(untitled document {})", self.id)
        } else {
            self.title.clone()
        }
    }
}
