//! Turning ranked matches into a remediation response.
//!
//! Only results at or above `min_score` are reported, at most `top_k` of them.
//! When nothing clears the threshold the response is an explicit no-match
//! carrying the normalized query and a list of evidence-gathering commands.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::safety::{CommandGuard, SafetyTier};
use crate::corpus::{DocId, Document};
use crate::search::{IndexSnapshot, MatchResult, Query, QueryHints};

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_MIN_SCORE: f64 = 3.0;
pub const DEFAULT_MAX_QUERY_CHARS: usize = 14_000;

/// Knobs for [`compose`].
#[derive(Debug, Clone)]
pub struct ResponseOptions {
    pub top_k: usize,
    pub min_score: f64,
    pub max_query_chars: usize,
    /// Screen suggested steps for destructive commands when set.
    pub guard: Option<CommandGuard>,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
            max_query_chars: DEFAULT_MAX_QUERY_CHARS,
            guard: Some(CommandGuard::builtin()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// High when a signal phrase fired or the score is far above threshold.
    pub fn for_hit(score: f64, signal_matched: bool, min_score: f64) -> Self {
        if signal_matched || score >= 4.0 * min_score {
            Self::High
        } else if score >= 2.0 * min_score {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A suggested step that was held back by the command guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithheldStep {
    pub section: String,
    pub step: String,
    pub tier: SafetyTier,
    pub reason: String,
}

/// A command to run for more evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoRequest {
    pub title: String,
    pub command: String,
    pub why: String,
}

impl InfoRequest {
    fn new(title: &str, command: &str, why: &str) -> Self {
        Self {
            title: title.to_string(),
            command: command.to_string(),
            why: why.to_string(),
        }
    }
}

/// Evidence-gathering commands suggested when nothing matched.
pub fn default_info_requests() -> Vec<InfoRequest> {
    vec![
        InfoRequest::new(
            "Describe the pod",
            "kubectl describe pod <pod> -n <namespace>",
            "Shows container states, last termination reason, exit codes and recent events.",
        ),
        InfoRequest::new(
            "Previous container logs",
            "kubectl logs <pod> -n <namespace> --previous",
            "Captures the output of the last crashed container instance.",
        ),
        InfoRequest::new(
            "Namespace events",
            "kubectl get events -n <namespace> --sort-by=.lastTimestamp",
            "Scheduling, image pull, mount and probe failures are reported as events.",
        ),
    ]
}

/// One reported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationHit {
    pub document_id: DocId,
    pub title: String,
    pub score: f64,
    pub matched_terms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<String>,
    pub root_causes: Vec<String>,
    pub fix_steps: Vec<String>,
    pub verify_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub withheld_steps: Vec<WithheldStep>,
}

/// Final answer for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComposedResponse {
    Matched {
        confidence: Confidence,
        needs_review: bool,
        #[serde(default)]
        query_truncated: bool,
        hints: QueryHints,
        hits: Vec<RemediationHit>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        info_requests: Vec<InfoRequest>,
    },
    NoMatch {
        query_terms: Vec<String>,
        #[serde(default)]
        query_truncated: bool,
        hints: QueryHints,
        /// Score of the best candidate that fell below the threshold.
        best_score: Option<f64>,
        info_requests: Vec<InfoRequest>,
    },
}

impl ComposedResponse {
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn hits(&self) -> &[RemediationHit] {
        match self {
            Self::Matched { hits, .. } => hits,
            Self::NoMatch { .. } => &[],
        }
    }

    pub const fn status(&self) -> &'static str {
        match self {
            Self::Matched { .. } => "matched",
            Self::NoMatch { .. } => "no_match",
        }
    }
}

/// Compose the response for `query` from its ranked `results`.
pub fn compose(
    query: &Query,
    results: &[MatchResult],
    snapshot: &IndexSnapshot,
    options: &ResponseOptions,
) -> ComposedResponse {
    let hits: Vec<RemediationHit> = results
        .iter()
        .filter(|result| result.score >= options.min_score)
        .take(options.top_k)
        .filter_map(|result| {
            snapshot
                .document(result.document_id)
                .map(|doc| build_hit(result, doc, options.guard.as_ref()))
        })
        .collect();

    let Some(top) = hits.first() else {
        let best_score = results.first().map(|result| result.score);
        debug!(?best_score, min_score = options.min_score, "no result cleared threshold");
        return ComposedResponse::NoMatch {
            query_terms: query.terms.clone(),
            query_truncated: query.truncated,
            hints: query.hints.clone(),
            best_score,
            info_requests: default_info_requests(),
        };
    };

    let confidence = Confidence::for_hit(top.score, !top.signals.is_empty(), options.min_score);
    let info_requests: Vec<InfoRequest> = hits
        .iter()
        .flat_map(|hit| &hit.withheld_steps)
        .map(|withheld| {
            InfoRequest::new(
                "Unsafe command withheld",
                "N/A",
                &format!(
                    "Suggested step looks unsafe ({}): {}. Review it and use a safer alternative.",
                    withheld.reason, withheld.step
                ),
            )
        })
        .collect();
    let needs_review = !info_requests.is_empty();

    debug!(
        hits = hits.len(),
        confidence = confidence.as_str(),
        needs_review,
        "composed response"
    );
    ComposedResponse::Matched {
        confidence,
        needs_review,
        query_truncated: query.truncated,
        hints: query.hints.clone(),
        hits,
        info_requests,
    }
}

fn build_hit(result: &MatchResult, doc: &Document, guard: Option<&CommandGuard>) -> RemediationHit {
    let mut withheld_steps = Vec::new();
    let fix_steps = screen_steps("fix", &doc.fix_steps, guard, &mut withheld_steps);
    let verify_steps = screen_steps("verify", &doc.verify_steps, guard, &mut withheld_steps);

    RemediationHit {
        document_id: doc.id,
        title: doc.display_title(),
        score: result.score,
        matched_terms: result.matched_terms.iter().cloned().collect(),
        signals: result.signals.clone(),
        root_causes: doc.root_causes.clone(),
        fix_steps,
        verify_steps,
        withheld_steps,
    }
}

fn screen_steps(
    section: &str,
    steps: &[String],
    guard: Option<&CommandGuard>,
    withheld: &mut Vec<WithheldStep>,
) -> Vec<String> {
    let Some(guard) = guard else {
        return steps.to_vec();
    };
    let mut kept = Vec::with_capacity(steps.len());
    for step in steps {
        let decision = guard.evaluate_command(step);
        if decision.allowed {
            kept.push(step.clone());
        } else {
            withheld.push(WithheldStep {
                section: section.to_string(),
                step: step.clone(),
                tier: decision.tier,
                reason: decision.reason,
            });
        }
    }
    kept
}
