//! External state snapshot for evaluation

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;
use crate::{
    chain::{ChainClient, SimulationOutcome},
    errors::{AgentError, AgentResult},
    types::TransactionDraft,
    utils::cancel::CancelToken,
};

/// Everything the criteria may consult besides the draft itself, fetched
/// once per evaluation round. A fetch that fails is recorded as absent and
/// the criterion needing it fails closed; the round itself never crashes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalSnapshot {
    pub simulation: Option<SimulationOutcome>,
    /// Sender's native balance in wei.
    pub sender_balance: Option<U256>,
    pub gas_price_gwei: Option<Decimal>,
}

/// Issues the three chain reads concurrently and joins them. Cancellation
/// aborts the whole gather; individual failures degrade to `None`.
pub async fn gather_snapshot(
    chain: &dyn ChainClient,
    draft: &TransactionDraft,
    cancel: &CancelToken,
) -> AgentResult<ExternalSnapshot> {
    if cancel.is_cancelled() {
        return Err(AgentError::Cancelled);
    }

    let balance_fut = async {
        match draft.from {
            Some(from) => chain.get_balance(from, None).await.map(Some),
            None => Ok(None),
        }
    };

    let (simulation, balance, gas_price) = tokio::select! {
        _ = cancel.cancelled() => return Err(AgentError::Cancelled),
        joined = async {
            tokio::join!(chain.simulate(draft), balance_fut, chain.gas_price())
        } => joined,
    };

    let simulation = match simulation {
        Ok(sim) => Some(sim),
        Err(e) => {
            warn!("Simulation unavailable for draft {}: {}", draft.id, e);
            None
        }
    };

    let sender_balance = match balance {
        Ok(balance) => balance,
        Err(e) => {
            warn!("Balance lookup failed for draft {}: {}", draft.id, e);
            None
        }
    };

    let gas_price_gwei = match gas_price {
        Ok(wei) => Some(Decimal::from(wei) / rust_decimal_macros::dec!(1_000_000_000)),
        Err(e) => {
            warn!("Gas price lookup failed for draft {}: {}", draft.id, e);
            None
        }
    };

    Ok(ExternalSnapshot {
        simulation,
        sender_balance,
        gas_price_gwei,
    })
}
