//! Evaluate/optimize state machine
//!
//! DRAFTED -> EVALUATING -> {PASSED | NEEDS_REVISION} ->
//! (REVISING -> DRAFTED)* -> {FINALIZED | REJECTED}
//!
//! The loop is an explicit counter with a hard ceiling, never recursion:
//! round N+1 starts only after round N's evaluation fully completed,
//! because the revision consumes the prior round's feedback.

use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::{
    chain::ChainClient,
    config::{Config, Registry},
    errors::{AgentError, AgentResult},
    types::{EvaluationResult, LoopOutcome, TransactionDraft},
    utils::cancel::CancelToken,
};
use super::{
    criteria::CriterionLimits,
    engine::evaluate_draft,
    optimizer::Optimizer,
};

pub struct EvaluationLoop {
    chain: Arc<dyn ChainClient>,
    optimizer: Optimizer,
    limits: CriterionLimits,
    max_retries: u32,
}

impl EvaluationLoop {
    pub fn new(chain: Arc<dyn ChainClient>, registry: Arc<Registry>, config: &Config) -> Self {
        Self {
            chain,
            optimizer: Optimizer::new(registry),
            limits: CriterionLimits::from_config(config),
            max_retries: config.max_retries,
        }
    }

    /// Drives one draft to a terminal state. At most `max_retries`
    /// revisions happen before the loop gives up; the final round's
    /// failure reasons are surfaced verbatim on rejection. Cancellation
    /// aborts between and inside rounds and never yields `Finalized`.
    pub async fn run(
        &self,
        draft: TransactionDraft,
        cancel: &CancelToken,
    ) -> AgentResult<LoopOutcome> {
        let mut draft = draft;
        let mut rounds: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(AgentError::Cancelled);
            }

            rounds += 1;
            debug!("Draft {} entering EVALUATING (round {})", draft.id, rounds);
            let result = evaluate_draft(self.chain.as_ref(), &draft, &self.limits, cancel).await?;

            if result.passed {
                info!("Draft {} FINALIZED after {} round(s)", draft.id, rounds);
                return Ok(LoopOutcome::Finalized {
                    draft,
                    result,
                    rounds,
                });
            }

            let revisions_used = rounds - 1;
            if revisions_used >= self.max_retries {
                let reasons = result.failure_reasons();
                warn!(
                    "Draft {} REJECTED: revision budget ({}) exhausted",
                    draft.id, self.max_retries
                );
                return Ok(LoopOutcome::Rejected { reasons, rounds });
            }

            debug!(
                "Draft {} NEEDS_REVISION ({} fix(es)), REVISING",
                draft.id,
                result.suggested_fixes.len()
            );
            draft = self.optimizer.revise(&draft, &result.suggested_fixes)?;
        }
    }
}

/// Convenience entry point matching the orchestration-facing contract.
pub async fn run_evaluation_loop(
    chain: Arc<dyn ChainClient>,
    registry: Arc<Registry>,
    config: &Config,
    draft: TransactionDraft,
    cancel: &CancelToken,
) -> AgentResult<LoopOutcome> {
    EvaluationLoop::new(chain, registry, config).run(draft, cancel).await
}

impl LoopOutcome {
    /// Converts a rejection into the taxonomy's terminal error for callers
    /// that want `?` ergonomics.
    pub fn into_result(self) -> AgentResult<(TransactionDraft, EvaluationResult)> {
        match self {
            LoopOutcome::Finalized { draft, result, .. } => Ok((draft, result)),
            LoopOutcome::Rejected { reasons, rounds } => {
                Err(AgentError::RevisionLimitExceeded {
                    attempts: rounds,
                    reasons,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, Bytes, U256};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use crate::chain::SimulationOutcome;
    use crate::types::DraftKind;

    /// Chain double whose simulation behavior is fixed per test.
    struct ScriptedChain {
        simulate_success: bool,
        simulate_calls: AtomicU32,
    }

    impl ScriptedChain {
        fn new(simulate_success: bool) -> Self {
            Self {
                simulate_success,
                simulate_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ChainClient for ScriptedChain {
        async fn call(&self, _to: Address, _data: Bytes) -> AgentResult<Bytes> {
            Ok(Bytes::new())
        }

        async fn estimate_gas(&self, _draft: &TransactionDraft) -> AgentResult<u64> {
            Ok(21_000)
        }

        async fn get_balance(
            &self,
            _address: Address,
            _token: Option<Address>,
        ) -> AgentResult<U256> {
            Ok(U256::from(crate::config::settings::ONE_ETH_WEI))
        }

        async fn gas_price(&self) -> AgentResult<u128> {
            Ok(12_000_000_000)
        }

        async fn simulate(&self, _draft: &TransactionDraft) -> AgentResult<SimulationOutcome> {
            self.simulate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(SimulationOutcome {
                success: self.simulate_success,
                asset_changes: BTreeMap::new(),
                gas_used: Some(21_000),
                revert_reason: if self.simulate_success {
                    None
                } else {
                    Some("execution reverted".to_string())
                },
            })
        }

        async fn submit(&self, _draft: &TransactionDraft) -> AgentResult<String> {
            Ok("0x0".to_string())
        }
    }

    fn transfer_draft() -> TransactionDraft {
        TransactionDraft {
            id: "draft".to_string(),
            revision: 0,
            kind: DraftKind::EthTransfer,
            from: Some(Address::ZERO),
            to: Address::ZERO,
            value: U256::from(1_000u32),
            data: Bytes::new(),
            estimated_gas: 21_000,
            gas_estimated: true,
            private_relay: false,
            max_priority_fee_gwei: None,
            swap_params: None,
        }
    }

    fn eval_loop(chain: Arc<ScriptedChain>, max_retries: u32) -> EvaluationLoop {
        let mut config = Config::load();
        config.max_retries = max_retries;
        EvaluationLoop::new(chain, Arc::new(Registry::mainnet()), &config)
    }

    #[tokio::test]
    async fn clean_draft_finalizes_in_one_round() {
        let chain = Arc::new(ScriptedChain::new(true));
        let outcome = eval_loop(chain.clone(), 3)
            .run(transfer_draft(), &CancelToken::never())
            .await
            .unwrap();

        match outcome {
            LoopOutcome::Finalized { rounds, draft, .. } => {
                assert_eq!(rounds, 1);
                assert_eq!(draft.revision, 0);
            }
            other => panic!("expected finalized, got {other:?}"),
        }
        assert_eq!(chain.simulate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn never_exceeds_the_revision_budget() {
        let max_retries = 3;
        let chain = Arc::new(ScriptedChain::new(false));
        let outcome = eval_loop(chain.clone(), max_retries)
            .run(transfer_draft(), &CancelToken::never())
            .await
            .unwrap();

        match outcome {
            LoopOutcome::Rejected { rounds, reasons } => {
                // max_retries revisions = max_retries + 1 evaluations.
                assert_eq!(rounds, max_retries + 1);
                assert!(reasons.iter().any(|r| r.contains("reverted")));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(
            chain.simulate_calls.load(Ordering::SeqCst),
            max_retries + 1
        );
    }

    #[tokio::test]
    async fn zero_retries_means_single_round() {
        let chain = Arc::new(ScriptedChain::new(false));
        let outcome = eval_loop(chain.clone(), 0)
            .run(transfer_draft(), &CancelToken::never())
            .await
            .unwrap();

        assert!(matches!(outcome, LoopOutcome::Rejected { rounds: 1, .. }));
        assert_eq!(chain.simulate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_preempts_finalization() {
        let chain = Arc::new(ScriptedChain::new(true));
        let (handle, token) = crate::utils::cancel::cancel_pair();
        handle.cancel();

        let err = eval_loop(chain, 3)
            .run(transfer_draft(), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Cancelled));
    }

    #[tokio::test]
    async fn rejection_converts_into_the_terminal_error() {
        let chain = Arc::new(ScriptedChain::new(false));
        let outcome = eval_loop(chain, 1)
            .run(transfer_draft(), &CancelToken::never())
            .await
            .unwrap();

        let err = outcome.into_result().unwrap_err();
        assert!(matches!(
            err,
            AgentError::RevisionLimitExceeded { attempts: 2, .. }
        ));
    }
}
