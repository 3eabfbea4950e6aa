//! Draft revision from evaluator feedback

use alloy::primitives::U256;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::debug;
use crate::{
    config::Registry,
    config::settings::PRIVATE_RELAY_PRIORITY_FEE_GWEI,
    drafting::encoder,
    errors::AgentResult,
    types::{SuggestedFix, TransactionDraft},
};

/// Applies the evaluator's typed fixes to derive the next draft revision.
/// Swap calldata is re-encoded whenever a fix changed the retained swap
/// parameters.
pub struct Optimizer {
    registry: Arc<Registry>,
}

impl Optimizer {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn revise(
        &self,
        draft: &TransactionDraft,
        fixes: &[SuggestedFix],
    ) -> AgentResult<TransactionDraft> {
        let mut next = draft.clone();
        next.revision += 1;
        let mut reencode = false;

        for fix in fixes {
            match fix {
                SuggestedFix::ReduceTradeSize { pct } => {
                    let keep = U256::from(100u32.saturating_sub(*pct));
                    let hundred = U256::from(100u8);
                    if let Some(params) = next.swap_params.as_mut() {
                        params.amount_in = params.amount_in * keep / hundred;
                        params.expected_out = params.expected_out * keep / hundred;
                        params.min_out = params.min_out * keep / hundred;
                        reencode = true;
                    } else {
                        next.value = next.value * keep / hundred;
                    }
                }
                SuggestedFix::AdjustSlippageTolerance { to_pct } => {
                    if let Some(params) = next.swap_params.as_mut() {
                        params.slippage_pct = *to_pct;
                        params.min_out = apply_tolerance(params.expected_out, *to_pct);
                        reencode = true;
                    }
                }
                SuggestedFix::TightenGasLimit { target } => {
                    next.estimated_gas = *target;
                    next.gas_estimated = true;
                }
                SuggestedFix::RaiseGasLimit { to } => {
                    next.estimated_gas = *to;
                    next.gas_estimated = true;
                }
                SuggestedFix::UsePrivateRelay => {
                    next.private_relay = true;
                    next.max_priority_fee_gwei = Some(PRIVATE_RELAY_PRIORITY_FEE_GWEI);
                }
            }
        }

        if reencode {
            if let Some(params) = &next.swap_params {
                let (to, data, value) = encoder::build_swap_call(&self.registry, params)?;
                next.to = to;
                next.data = data;
                next.value = value;
            }
        }

        debug!(
            "Revised draft {} to revision {} applying {} fix(es)",
            next.id,
            next.revision,
            fixes.len()
        );
        Ok(next)
    }
}

/// `expected * (1 - tolerance%)` in integer math, rounding the tolerance
/// to whole basis points.
fn apply_tolerance(expected: U256, tolerance_pct: rust_decimal::Decimal) -> U256 {
    let bps = (tolerance_pct * dec!(100))
        .round()
        .to_u64()
        .unwrap_or(10_000)
        .min(10_000);
    expected * U256::from(10_000 - bps) / U256::from(10_000u32)
}
