//! Evaluation result types

use std::fmt;
use rust_decimal::Decimal;
use serde::Serialize;
use super::TransactionDraft;

/// The four validation criteria applied to every draft. The set is fixed so
/// the evaluation step stays statically verifiable; scores are collected in
/// a `[CriterionScore; 4]` rather than a dynamically extended list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Criterion {
    GasEfficiency,
    Security,
    Correctness,
    Slippage,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::GasEfficiency,
        Criterion::Security,
        Criterion::Correctness,
        Criterion::Slippage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Criterion::GasEfficiency => "gas-efficiency",
            Criterion::Security => "security",
            Criterion::Correctness => "correctness",
            Criterion::Slippage => "slippage",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Machine-usable adjustment emitted by a failing criterion. `Display`
/// renders the human-readable form surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SuggestedFix {
    ReduceTradeSize { pct: u32 },
    AdjustSlippageTolerance { to_pct: Decimal },
    TightenGasLimit { target: u64 },
    RaiseGasLimit { to: u64 },
    UsePrivateRelay,
}

impl fmt::Display for SuggestedFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestedFix::ReduceTradeSize { pct } => {
                write!(f, "reduce trade size by {pct}%")
            }
            SuggestedFix::AdjustSlippageTolerance { to_pct } => {
                write!(f, "adjust slippage tolerance to {to_pct}%")
            }
            SuggestedFix::TightenGasLimit { target } => {
                write!(f, "tighten gas limit toward {target} units")
            }
            SuggestedFix::RaiseGasLimit { to } => {
                write!(f, "raise gas limit to {to} units")
            }
            SuggestedFix::UsePrivateRelay => {
                write!(f, "route through a private relay to limit MEV exposure")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionScore {
    pub criterion: Criterion,
    pub passed: bool,
    pub reason: String,
    pub suggested_fix: Option<SuggestedFix>,
}

impl CriterionScore {
    pub fn pass(criterion: Criterion, reason: impl Into<String>) -> Self {
        Self {
            criterion,
            passed: true,
            reason: reason.into(),
            suggested_fix: None,
        }
    }

    pub fn fail(
        criterion: Criterion,
        reason: impl Into<String>,
        fix: Option<SuggestedFix>,
    ) -> Self {
        Self {
            criterion,
            passed: false,
            reason: reason.into(),
            suggested_fix: fix,
        }
    }
}

/// Outcome of one evaluation round over a single draft version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub passed: bool,
    pub criterion_scores: [CriterionScore; 4],
    /// Failing criteria's fixes, in criterion order.
    pub suggested_fixes: Vec<SuggestedFix>,
}

impl EvaluationResult {
    pub fn failure_reasons(&self) -> Vec<String> {
        self.criterion_scores
            .iter()
            .filter(|s| !s.passed)
            .map(|s| format!("{}: {}", s.criterion, s.reason))
            .collect()
    }
}

/// Terminal outcome of the evaluate/optimize loop.
#[derive(Debug)]
pub enum LoopOutcome {
    /// All criteria passed; the draft is ready for submission by the caller.
    Finalized {
        draft: TransactionDraft,
        result: EvaluationResult,
        rounds: u32,
    },
    /// The revision budget is exhausted; the final round's failure reasons
    /// are surfaced verbatim.
    Rejected { reasons: Vec<String>, rounds: u32 },
}
