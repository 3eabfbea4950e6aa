//! Single evaluation round

use tracing::debug;
use crate::{
    chain::ChainClient,
    errors::AgentResult,
    types::{EvaluationResult, TransactionDraft},
    utils::cancel::CancelToken,
};
use super::{
    criteria::{evaluate_criteria, CriterionLimits},
    snapshot::gather_snapshot,
};

/// Runs one evaluation round: gather the external snapshot, apply the four
/// criteria, join the scores. Criteria themselves are pure, so identical
/// draft and snapshot inputs reproduce the result byte for byte.
pub async fn evaluate_draft(
    chain: &dyn ChainClient,
    draft: &TransactionDraft,
    limits: &CriterionLimits,
    cancel: &CancelToken,
) -> AgentResult<EvaluationResult> {
    let snapshot = gather_snapshot(chain, draft, cancel).await?;
    let criterion_scores = evaluate_criteria(draft, &snapshot, limits);

    let passed = criterion_scores.iter().all(|score| score.passed);
    let suggested_fixes = criterion_scores
        .iter()
        .filter(|score| !score.passed)
        .filter_map(|score| score.suggested_fix.clone())
        .collect();

    debug!(
        "Draft {} rev {} evaluated: passed={} ({})",
        draft.id,
        draft.revision,
        passed,
        criterion_scores
            .iter()
            .map(|s| format!("{}={}", s.criterion, s.passed))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(EvaluationResult {
        passed,
        criterion_scores,
        suggested_fixes,
    })
}
