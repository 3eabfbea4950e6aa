//! Chain client abstraction and JSON-RPC implementation

use alloy::{
    primitives::{Address, Bytes, U256, keccak256},
    providers::Provider,
    rpc::types::eth::TransactionRequest,
    sol_types::SolValue,
};
use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;
use crate::{
    errors::{AgentError, AgentResult},
    network::retry::{retry_with_backoff, RetryConfig},
    types::TransactionDraft,
    ConcreteProvider,
};

/// Result of a dry-run simulation of a draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub success: bool,
    /// Net asset deltas from the sender's perspective, keyed by token
    /// symbol (or contract address when the symbol is unknown), in human
    /// units. `BTreeMap` keeps serialization deterministic.
    pub asset_changes: BTreeMap<String, Decimal>,
    pub gas_used: Option<u64>,
    pub revert_reason: Option<String>,
}

/// Read/submit boundary to the chain. Everything the core needs from the
/// outside world goes through this trait so evaluation can run against a
/// deterministic double in tests.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Raw `eth_call` against a contract.
    async fn call(&self, to: Address, data: Bytes) -> AgentResult<Bytes>;

    async fn estimate_gas(&self, draft: &TransactionDraft) -> AgentResult<u64>;

    /// Native balance when `token` is `None`, ERC-20 balance otherwise,
    /// in base units.
    async fn get_balance(&self, address: Address, token: Option<Address>) -> AgentResult<U256>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> AgentResult<u128>;

    async fn simulate(&self, draft: &TransactionDraft) -> AgentResult<SimulationOutcome>;

    /// Signs and submits a draft. Submission is an external collaborator
    /// action; the evaluate/optimize loop never calls this.
    async fn submit(&self, draft: &TransactionDraft) -> AgentResult<String>;
}

/// Production client over an alloy HTTP provider, with transport-level
/// retry and Alchemy's `simulateAssetChanges` for dry runs.
pub struct RpcChainClient {
    provider: Arc<ConcreteProvider>,
    retry: RetryConfig,
}

impl RpcChainClient {
    pub fn new(provider: Arc<ConcreteProvider>) -> Self {
        Self {
            provider,
            retry: RetryConfig::quick(),
        }
    }

    fn draft_to_request(draft: &TransactionDraft) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .to(draft.to)
            .value(draft.value)
            .input(draft.data.clone().into());
        if let Some(from) = draft.from {
            tx = tx.from(from);
        }
        tx
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn call(&self, to: Address, data: Bytes) -> AgentResult<Bytes> {
        let operation = || async {
            let tx = TransactionRequest::default().to(to).input(data.clone().into());
            self.provider.call(&tx).await.context("eth_call failed")
        };

        retry_with_backoff(operation, &self.retry, &format!("eth_call to {to}"))
            .await
            .map_err(|e| match e {
                AgentError::Network { .. } => e,
                other => AgentError::Contract {
                    contract: to,
                    message: "eth_call failed".to_string(),
                    source: anyhow::anyhow!("{}", other),
                },
            })
    }

    async fn estimate_gas(&self, draft: &TransactionDraft) -> AgentResult<u64> {
        let tx = Self::draft_to_request(draft);
        let gas = self
            .provider
            .estimate_gas(&tx)
            .await
            .map_err(|e| AgentError::Network {
                message: "eth_estimateGas failed".to_string(),
                source: Some(e.into()),
                retry_count: 0,
            })?;
        Ok(u64::try_from(gas).unwrap_or(u64::MAX))
    }

    async fn get_balance(&self, address: Address, token: Option<Address>) -> AgentResult<U256> {
        match token {
            None => self
                .provider
                .get_balance(address)
                .await
                .map_err(|e| AgentError::Network {
                    message: "eth_getBalance failed".to_string(),
                    source: Some(e.into()),
                    retry_count: 0,
                }),
            Some(token) => {
                let mut data = keccak256("balanceOf(address)")[..4].to_vec();
                data.extend_from_slice(&[0u8; 12]);
                data.extend_from_slice(address.as_slice());
                let raw = self.call(token, data.into()).await?;
                U256::abi_decode(&raw, true).map_err(|e| AgentError::DataParsing {
                    context: format!("balanceOf({address}) on {token}"),
                    source: e.into(),
                })
            }
        }
    }

    async fn gas_price(&self) -> AgentResult<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| AgentError::Network {
                message: "eth_gasPrice failed".to_string(),
                source: Some(e.into()),
                retry_count: 0,
            })
    }

    async fn simulate(&self, draft: &TransactionDraft) -> AgentResult<SimulationOutcome> {
        let from = draft.from.ok_or_else(|| AgentError::InvalidIntent {
            reason: "draft has no sender for simulation".to_string(),
        })?;

        let params = serde_json::json!({
            "from": format!("{from}"),
            "to": format!("{}", draft.to),
            "value": format!("0x{:x}", draft.value),
            "data": format!("{}", draft.data),
        });

        let response: serde_json::Value = self
            .provider
            .raw_request("alchemy_simulateAssetChanges".into(), [params])
            .await
            .map_err(|e| AgentError::Network {
                message: "simulateAssetChanges failed".to_string(),
                source: Some(e.into()),
                retry_count: 0,
            })?;

        parse_simulation_response(from, &response)
    }

    async fn submit(&self, draft: &TransactionDraft) -> AgentResult<String> {
        let tx = Self::draft_to_request(draft);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| AgentError::Network {
                message: "transaction submission failed".to_string(),
                source: Some(e.into()),
                retry_count: 0,
            })?;
        Ok(format!("{:?}", pending.tx_hash()))
    }
}

/// Folds the raw simulation payload into per-asset net deltas from the
/// sender's perspective.
fn parse_simulation_response(
    sender: Address,
    response: &serde_json::Value,
) -> AgentResult<SimulationOutcome> {
    if let Some(error) = response.get("error") {
        // The error slot is either a bare string or {message, ...}.
        let message = error
            .as_str()
            .map(|s| s.to_string())
            .or_else(|| {
                error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| error.to_string());
        return Ok(SimulationOutcome {
            success: false,
            asset_changes: BTreeMap::new(),
            gas_used: None,
            revert_reason: Some(message),
        });
    }

    let changes = response
        .get("changes")
        .and_then(|c| c.as_array())
        .cloned()
        .unwrap_or_default();

    let sender_hex = format!("{sender:#x}").to_lowercase();
    let mut asset_changes: BTreeMap<String, Decimal> = BTreeMap::new();

    for change in &changes {
        let asset = change
            .get("symbol")
            .and_then(|s| s.as_str())
            .map(|s| s.to_uppercase())
            .or_else(|| {
                change
                    .get("contractAddress")
                    .and_then(|a| a.as_str())
                    .map(|a| a.to_lowercase())
            })
            .unwrap_or_else(|| "ETH".to_string());

        let amount = change
            .get("amount")
            .and_then(|a| a.as_str())
            .and_then(|a| Decimal::from_str(a).ok())
            .unwrap_or_default();

        let outgoing = change
            .get("from")
            .and_then(|f| f.as_str())
            .map(|f| f.to_lowercase() == sender_hex)
            .unwrap_or(false);

        let delta = if outgoing { -amount } else { amount };
        *asset_changes.entry(asset).or_default() += delta;
    }

    let gas_used = response
        .get("gasUsed")
        .and_then(|g| g.as_str())
        .and_then(|g| u64::from_str_radix(g.trim_start_matches("0x"), 16).ok());

    if gas_used.is_none() && changes.is_empty() {
        warn!("Simulation returned no changes and no gas usage");
    }

    Ok(SimulationOutcome {
        success: true,
        asset_changes,
        gas_used,
        revert_reason: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sender() -> Address {
        Address::from_str("0x1111111111111111111111111111111111111111").unwrap()
    }

    #[test]
    fn parses_asset_changes_with_direction() {
        let response = serde_json::json!({
            "changes": [
                {
                    "assetType": "ERC20",
                    "symbol": "USDC",
                    "from": "0x1111111111111111111111111111111111111111",
                    "to": "0x2222222222222222222222222222222222222222",
                    "amount": "3245.50"
                },
                {
                    "assetType": "ERC20",
                    "symbol": "WETH",
                    "from": "0x2222222222222222222222222222222222222222",
                    "to": "0x1111111111111111111111111111111111111111",
                    "amount": "1.0"
                }
            ],
            "gasUsed": "0x222e0"
        });

        let outcome = parse_simulation_response(sender(), &response).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.asset_changes["USDC"], dec!(-3245.50));
        assert_eq!(outcome.asset_changes["WETH"], dec!(1.0));
        assert_eq!(outcome.gas_used, Some(140_000));
    }

    #[test]
    fn reports_revert_as_unsuccessful() {
        let response = serde_json::json!({ "error": "execution reverted: STF" });
        let outcome = parse_simulation_response(sender(), &response).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.revert_reason.as_deref(), Some("execution reverted: STF"));
    }
}
