use lookout_core::tools::is_file_producing;
use lookout_core::{DetectionConfig, ToolInvocation, ToolName};
use serde::Serialize;

use crate::extract::extract_artifact;
use crate::score::{is_auxiliary_file, score_breakdown, CandidateContext, ScoreBreakdown};

/// Substrings that drop a file before it is ever scored.
const EXCLUDED_SUBSTRINGS: &[&str] = &["test.", "spec.", "_test.", ".test."];

/// Name of the explicit fallback deliverable.
const FALLBACK_MAIN_FILE: &str = "index.html";

/// A scored, surviving candidate.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    /// Position in the invocation slice.
    pub raw_index: usize,
    pub tool_name: ToolName,
    pub file_name: String,
    pub file_path: Option<String>,
    pub breakdown: ScoreBreakdown,
}

impl ScoredCandidate {
    pub fn score(&self) -> f64 {
        self.breakdown.total
    }
}

/// Auxiliary files and test/spec files never compete, whatever they would score.
pub fn is_excluded_name(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    is_auxiliary_file(&lower) || EXCLUDED_SUBSTRINGS.iter().any(|s| lower.contains(s))
}

/// File-producing invocation with a resolvable, non-excluded file name.
pub(crate) fn eligible_artifact(
    inv: &ToolInvocation,
    config: &DetectionConfig,
) -> Option<(String, Option<String>)> {
    if !is_file_producing(&inv.tool_name) {
        return None;
    }
    let artifact = extract_artifact(&inv.call_payload).strip_roots(&config.workspace_roots);
    let file_name = artifact.file_name?;
    if is_excluded_name(&file_name) {
        return None;
    }
    Some((file_name, artifact.file_path))
}

pub(crate) fn score_invocation(
    inv: &ToolInvocation,
    file_name: &str,
    file_path: Option<&str>,
    total: usize,
    config: &DetectionConfig,
) -> ScoreBreakdown {
    let ctx = CandidateContext::new(inv.sequence_index, total, file_name, file_path, &inv.tool_name)
        .with_recency_weight(config.recency_weight);
    score_breakdown(&ctx)
}

/// Every surviving candidate, best first. Equal scores keep stream order.
pub fn rank_candidates(
    invocations: &[ToolInvocation],
    config: &DetectionConfig,
) -> Vec<ScoredCandidate> {
    let total = invocations.len();
    let mut ranked: Vec<ScoredCandidate> = invocations
        .iter()
        .enumerate()
        .filter_map(|(raw_index, inv)| {
            let (file_name, file_path) = eligible_artifact(inv, config)?;
            let breakdown =
                score_invocation(inv, &file_name, file_path.as_deref(), total, config);
            tracing::debug!(
                raw_index,
                tool = %inv.tool_name,
                file = %file_name,
                score = %breakdown.render(),
                "scored candidate"
            );
            Some(ScoredCandidate {
                raw_index,
                tool_name: inv.tool_name.clone(),
                file_name,
                file_path,
                breakdown,
            })
        })
        .collect();
    // `sort_by` is stable, which is what keeps ties in stream order.
    ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));
    ranked
}

/// Pick at most one main deliverable. `None` is the normal "nothing confident" answer.
pub fn select_main_artifact(
    invocations: &[ToolInvocation],
    config: &DetectionConfig,
) -> Option<usize> {
    let ranked = rank_candidates(invocations, config);
    let top = ranked.first()?;

    if top.score() >= config.main_threshold {
        tracing::debug!(
            raw_index = top.raw_index,
            file = %top.file_name,
            score = top.score(),
            "main artifact above threshold"
        );
        return Some(top.raw_index);
    }

    // Earliest index.html in stream order, regardless of its score.
    let fallback = ranked
        .iter()
        .filter(|c| c.file_name.eq_ignore_ascii_case(FALLBACK_MAIN_FILE))
        .min_by_key(|c| c.raw_index);
    match fallback {
        Some(c) => {
            tracing::debug!(raw_index = c.raw_index, score = c.score(), "index.html fallback");
            Some(c.raw_index)
        }
        None => {
            tracing::debug!(
                best = top.score(),
                threshold = config.main_threshold,
                "no confident main artifact"
            );
            None
        }
    }
}
