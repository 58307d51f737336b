//! Destructive command screening for suggested remediation steps.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{KtError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyTier {
    Safe,
    Caution,
    Danger,
    Critical,
}

/// Built-in rules: (id, pattern, tier, reason).
const BUILTIN_RULES: &[(&str, &str, SafetyTier, &str)] = &[
    (
        "rm-rf",
        r"\brm\s+-(?:[a-z]*r[a-z]*f|[a-z]*f[a-z]*r)[a-z]*\b",
        SafetyTier::Critical,
        "recursive forced delete",
    ),
    ("wipefs", r"\bwipefs\b", SafetyTier::Critical, "erases filesystem signatures"),
    ("mkfs", r"\bmkfs\.", SafetyTier::Critical, "formats a block device"),
    ("dd", r"\bdd\s+if=", SafetyTier::Critical, "raw block device write"),
    (
        "fork-bomb",
        r":\(\)\s*\{\s*:\s*\|\s*:\s*&?\s*;?\s*\}\s*;\s*:",
        SafetyTier::Critical,
        "fork bomb",
    ),
    (
        "kubectl-delete-namespace",
        r"\bkubectl\b.*\bdelete\s+(?:ns|namespaces?)\b",
        SafetyTier::Danger,
        "deletes a namespace and everything in it",
    ),
    (
        "kubectl-delete-all",
        r"\bkubectl\b.*\bdelete\b.*--all\b",
        SafetyTier::Danger,
        "bulk delete of cluster resources",
    ),
];

/// Outcome of screening one command or step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDecision {
    pub allowed: bool,
    pub tier: SafetyTier,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl CommandDecision {
    fn allowed(reason: &str) -> Self {
        Self {
            allowed: true,
            tier: SafetyTier::Safe,
            reason: reason.to_string(),
            rule_id: None,
        }
    }
}

#[derive(Debug, Clone)]
struct GuardRule {
    id: String,
    pattern: Regex,
    tier: SafetyTier,
    reason: String,
}

/// Regex-based guard. Anything at [`SafetyTier::Danger`] or above is blocked.
#[derive(Debug, Clone)]
pub struct CommandGuard {
    rules: Vec<GuardRule>,
}

impl CommandGuard {
    /// Guard with the built-in rules only.
    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .filter_map(|(id, pattern, tier, reason)| {
                compile(pattern).ok().map(|pattern| GuardRule {
                    id: (*id).to_string(),
                    pattern,
                    tier: *tier,
                    reason: (*reason).to_string(),
                })
            })
            .collect();
        Self { rules }
    }

    /// Built-in rules plus user patterns, which are treated as `Danger`.
    pub fn with_extra_patterns(patterns: &[String]) -> Result<Self> {
        let mut guard = Self::builtin();
        for (idx, raw) in patterns.iter().enumerate() {
            let pattern = compile(raw).map_err(|err| {
                KtError::Config(format!("safety.extra_patterns[{idx}] `{raw}`: {err}"))
            })?;
            guard.rules.push(GuardRule {
                id: format!("extra-{idx}"),
                pattern,
                tier: SafetyTier::Danger,
                reason: format!("matches configured pattern `{raw}`"),
            });
        }
        Ok(guard)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Screen `command`, reporting the most severe matching rule.
    pub fn evaluate_command(&self, command: &str) -> CommandDecision {
        if command.trim().is_empty() {
            return CommandDecision::allowed("empty command");
        }

        let worst = self
            .rules
            .iter()
            .filter(|rule| rule.pattern.is_match(command))
            .max_by_key(|rule| rule.tier);

        match worst {
            Some(rule) => CommandDecision {
                allowed: rule.tier < SafetyTier::Danger,
                tier: rule.tier,
                reason: rule.reason.clone(),
                rule_id: Some(rule.id.clone()),
            },
            None => CommandDecision::allowed("no destructive pattern"),
        }
    }

    pub fn is_dangerous(&self, command: &str) -> bool {
        !self.evaluate_command(command).allowed
    }
}

impl Default for CommandGuard {
    fn default() -> Self {
        Self::builtin()
    }
}

fn compile(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}
