//! Validation criteria
//!
//! Each criterion is a plain function from (draft, snapshot, limits) to a
//! typed score, collected into a fixed-size array at the join point. A
//! criterion whose required external data is absent fails closed rather
//! than crashing the round, and every reason string is a pure function of
//! its inputs so re-evaluating an unchanged draft against an unchanged
//! snapshot reproduces the result exactly.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use crate::{
    config::Config,
    config::settings::ONE_ETH_WEI,
    errors::AgentError,
    types::{Criterion, CriterionScore, DraftKind, SuggestedFix, TransactionDraft},
    utils::math::from_base_units,
};
use super::snapshot::ExternalSnapshot;

/// Correctness tolerates a 2% deviation between simulated and expected
/// output before flagging the draft.
const ASSET_CHANGE_TOLERANCE_PCT: Decimal = dec!(2);

#[derive(Debug, Clone)]
pub struct CriterionLimits {
    pub max_slippage_pct: Decimal,
    /// Swaps moving more value than this without relay protection are
    /// considered MEV-exposed.
    pub mev_value_threshold_wei: U256,
    pub confirmation_value_threshold_wei: U256,
}

impl CriterionLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_slippage_pct: config.max_slippage_pct,
            mev_value_threshold_wei: U256::from(ONE_ETH_WEI),
            confirmation_value_threshold_wei: U256::from(ONE_ETH_WEI),
        }
    }
}

/// Per-kind gas ceilings, in units; a draft fails gas-efficiency above
/// 1.5x its kind's ceiling.
pub(crate) fn gas_threshold(kind: DraftKind) -> u64 {
    match kind {
        DraftKind::EthTransfer => 21_000,
        DraftKind::Erc20Transfer | DraftKind::Approve => 65_000,
        DraftKind::SimpleSwap => 150_000,
        DraftKind::ComplexSwap => 300_000,
    }
}

pub fn evaluate_criteria(
    draft: &TransactionDraft,
    snapshot: &ExternalSnapshot,
    limits: &CriterionLimits,
) -> [CriterionScore; 4] {
    [
        check_gas_efficiency(draft),
        check_security(draft, limits),
        check_correctness(draft, snapshot),
        check_slippage(draft, limits),
    ]
}

fn check_gas_efficiency(draft: &TransactionDraft) -> CriterionScore {
    let threshold = gas_threshold(draft.kind);
    let ceiling = threshold.saturating_add(threshold / 2);

    if draft.estimated_gas > ceiling {
        return CriterionScore::fail(
            Criterion::GasEfficiency,
            format!(
                "gas limit {} exceeds the {:?} ceiling {} by more than 50%",
                draft.estimated_gas, draft.kind, threshold
            ),
            Some(SuggestedFix::TightenGasLimit { target: threshold }),
        );
    }

    CriterionScore::pass(
        Criterion::GasEfficiency,
        format!(
            "gas limit {} is within range for {:?}",
            draft.estimated_gas, draft.kind
        ),
    )
}

fn check_security(draft: &TransactionDraft, limits: &CriterionLimits) -> CriterionScore {
    if draft.is_swap() && draft.value > limits.mev_value_threshold_wei && !draft.private_relay {
        return CriterionScore::fail(
            Criterion::Security,
            format!(
                "swap moves {} wei through the public mempool and is MEV-exposed",
                draft.value
            ),
            Some(SuggestedFix::UsePrivateRelay),
        );
    }

    if draft.value > limits.confirmation_value_threshold_wei {
        return CriterionScore::fail(
            Criterion::Security,
            format!(
                "value {} wei exceeds the unconfirmed-transfer threshold",
                draft.value
            ),
            Some(SuggestedFix::ReduceTradeSize { pct: 20 }),
        );
    }

    CriterionScore::pass(Criterion::Security, "value and routing within limits")
}

fn check_correctness(draft: &TransactionDraft, snapshot: &ExternalSnapshot) -> CriterionScore {
    let sim = match &snapshot.simulation {
        Some(sim) => sim,
        None => {
            // Fail closed: without a simulation we cannot vouch for the
            // state change.
            let err = AgentError::CriterionFailed {
                criterion: Criterion::Correctness.name().to_string(),
                reason: "simulation unavailable".to_string(),
            };
            return CriterionScore::fail(Criterion::Correctness, err.to_string(), None);
        }
    };

    if !sim.success {
        let reason = sim
            .revert_reason
            .clone()
            .unwrap_or_else(|| "unknown revert".to_string());
        let fix = fix_for_revert(draft, &reason);
        return CriterionScore::fail(
            Criterion::Correctness,
            format!("simulation reverted: {reason}"),
            fix,
        );
    }

    let Some(params) = &draft.swap_params else {
        return CriterionScore::pass(Criterion::Correctness, "simulation succeeded");
    };

    let expected = match from_base_units(params.expected_out, params.token_out_decimals) {
        Ok(expected) if expected > dec!(0) => expected,
        _ => {
            return CriterionScore::fail(
                Criterion::Correctness,
                "draft expects no output".to_string(),
                None,
            );
        }
    };

    let actual = sim
        .asset_changes
        .get(&params.token_out_symbol)
        .copied()
        .unwrap_or_default();

    if actual <= dec!(0) {
        return CriterionScore::fail(
            Criterion::Correctness,
            format!("simulation shows no {} inflow", params.token_out_symbol),
            None,
        );
    }

    let deviation_pct = (actual - expected).abs() / expected * dec!(100);
    if deviation_pct > ASSET_CHANGE_TOLERANCE_PCT {
        return CriterionScore::fail(
            Criterion::Correctness,
            format!(
                "simulated {} output {} deviates {:.2}% from expected {}",
                params.token_out_symbol, actual, deviation_pct, expected
            ),
            Some(SuggestedFix::ReduceTradeSize { pct: 20 }),
        );
    }

    CriterionScore::pass(
        Criterion::Correctness,
        format!(
            "simulated {} output {} matches expectation",
            params.token_out_symbol, actual
        ),
    )
}

fn fix_for_revert(draft: &TransactionDraft, reason: &str) -> Option<SuggestedFix> {
    let lowered = reason.to_lowercase();
    if lowered.contains("gas") {
        return Some(SuggestedFix::RaiseGasLimit {
            to: draft.estimated_gas.saturating_add(draft.estimated_gas / 2),
        });
    }
    if lowered.contains("insufficient") {
        return Some(SuggestedFix::ReduceTradeSize { pct: 50 });
    }
    None
}

fn check_slippage(draft: &TransactionDraft, limits: &CriterionLimits) -> CriterionScore {
    let Some(params) = &draft.swap_params else {
        return CriterionScore::pass(Criterion::Slippage, "no slippage exposure for this draft");
    };

    if params.expected_out == U256::ZERO {
        return CriterionScore::fail(
            Criterion::Slippage,
            "expected output is zero".to_string(),
            None,
        );
    }

    // Read the tolerance back out of the encoded amounts; the encoded
    // min_out is what the chain will enforce.
    let expected = match from_base_units(params.expected_out, params.token_out_decimals) {
        Ok(v) => v,
        Err(e) => {
            let err = AgentError::CriterionFailed {
                criterion: Criterion::Slippage.name().to_string(),
                reason: format!("unreadable expected output: {e}"),
            };
            return CriterionScore::fail(Criterion::Slippage, err.to_string(), None);
        }
    };
    let min_out = from_base_units(params.min_out, params.token_out_decimals).unwrap_or_default();

    let slippage_pct = (expected - min_out) / expected * dec!(100);
    if slippage_pct > limits.max_slippage_pct {
        return CriterionScore::fail(
            Criterion::Slippage,
            format!(
                "tolerance {:.2}% exceeds the {:.2}% ceiling",
                slippage_pct, limits.max_slippage_pct
            ),
            Some(SuggestedFix::AdjustSlippageTolerance {
                to_pct: limits.max_slippage_pct,
            }),
        );
    }

    CriterionScore::pass(
        Criterion::Slippage,
        format!("tolerance {:.2}% within bounds", slippage_pct),
    )
}
