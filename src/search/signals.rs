//! Signal phrases and query hints.
//!
//! A signal phrase is a short error string that is close to a deterministic
//! diagnosis (an exit code, a platform reason, a well-known error message).
//! When it appears in the query, every document containing the same phrase
//! receives the phrase's fixed bonus on top of plain term overlap.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::tokenize::{contains_phrase, phrase_text, tokenize};

/// Built-in signal table: phrase -> additive bonus.
pub const DEFAULT_SIGNALS: &[(&str, f64)] = &[
    ("oomkilled", 10.0),
    ("exit code 137", 10.0),
    ("exit code 139", 8.0),
    ("imagepullbackoff", 10.0),
    ("errimagepull", 10.0),
    ("manifest unknown", 8.0),
    ("pull access denied", 8.0),
    ("crashloopbackoff", 8.0),
    ("exec format error", 12.0),
    ("no match for platform in manifest", 12.0),
    ("createcontainerconfigerror", 10.0),
    ("failedscheduling", 8.0),
    ("insufficient cpu", 8.0),
    ("insufficient memory", 8.0),
    ("no such host", 6.0),
    ("temporary failure in name resolution", 6.0),
    ("readiness probe failed", 8.0),
    ("liveness probe failed", 8.0),
    ("evicted", 6.0),
    ("diskpressure", 6.0),
    ("failedmount", 8.0),
    ("failedattachvolume", 8.0),
];

/// Platform reason words recognized as query hints, in canonical casing.
pub const KNOWN_REASONS: &[&str] = &[
    "CrashLoopBackOff",
    "ImagePullBackOff",
    "ErrImagePull",
    "InvalidImageName",
    "OOMKilled",
    "CreateContainerConfigError",
    "CreateContainerError",
    "RunContainerError",
    "ContainerCannotRun",
    "FailedScheduling",
    "FailedMount",
    "FailedAttachVolume",
    "Evicted",
    "DiskPressure",
    "MemoryPressure",
    "DeadlineExceeded",
];

static EXIT_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bexit(?:ed)?[\s_-]*(?:with[\s_-]+)?(?:code|status)[\s_-]*[:=]?[\s]*(\d{1,3})\b")
        .expect("exit code pattern is valid")
});

/// One row of the signal table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRule {
    pub phrase: String,
    pub bonus: f64,
}

impl SignalRule {
    pub fn new(phrase: impl Into<String>, bonus: f64) -> Self {
        Self {
            phrase: phrase.into(),
            bonus,
        }
    }
}

/// Ordered signal table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTable {
    rules: Vec<SignalRule>,
}

impl Default for SignalTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SignalTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        Self {
            rules: DEFAULT_SIGNALS
                .iter()
                .map(|(phrase, bonus)| SignalRule::new(*phrase, *bonus))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Built-in table followed by `extra` rules.
    ///
    /// Rules with a blank phrase or a non-positive bonus are ignored, and a
    /// phrase already present keeps its first bonus.
    pub fn with_extra(extra: &[SignalRule]) -> Self {
        let mut table = Self::builtin();
        for rule in extra {
            table.push(rule.clone());
        }
        table
    }

    pub fn push(&mut self, rule: SignalRule) {
        let normalized = phrase_text(&rule.phrase);
        if normalized.trim().is_empty() || rule.bonus.is_nan() || rule.bonus <= 0.0 {
            return;
        }
        if self
            .rules
            .iter()
            .any(|existing| phrase_text(&existing.phrase) == normalized)
        {
            return;
        }
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[SignalRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Indices of the rules whose phrase occurs in `haystack` (a [`phrase_text`]).
    pub fn matching(&self, haystack: &str) -> Vec<usize> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| contains_phrase(haystack, &rule.phrase))
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Structured hints pulled out of free text before matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryHints {
    /// Reported container exit codes, in order of appearance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exit_codes: Vec<u16>,
    /// Known platform reasons (e.g. `ImagePullBackOff`), canonical casing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl QueryHints {
    pub fn extract(text: &str) -> Self {
        let mut exit_codes = Vec::new();
        for caps in EXIT_CODE.captures_iter(text) {
            if let Some(code) = caps.get(1).and_then(|m| m.as_str().parse::<u16>().ok()) {
                if !exit_codes.contains(&code) {
                    exit_codes.push(code);
                }
            }
        }

        let mut reasons = Vec::new();
        for token in tokenize(text) {
            if let Some(reason) = KNOWN_REASONS
                .iter()
                .find(|reason| reason.eq_ignore_ascii_case(&token))
            {
                let reason = (*reason).to_string();
                if !reasons.contains(&reason) {
                    reasons.push(reason);
                }
            }
        }

        Self {
            exit_codes,
            reasons,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exit_codes.is_empty() && self.reasons.is_empty()
    }

    /// Canonical phrases implied by the hints, e.g. `exit code 137`.
    pub fn canonical_phrases(&self) -> Vec<String> {
        self.exit_codes
            .iter()
            .map(|code| format!("exit code {code}"))
            .collect()
    }
}
