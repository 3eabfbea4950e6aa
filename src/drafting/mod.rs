//! Transaction drafting
//!
//! Turns a structured intent or a detected opportunity into an unsigned
//! `TransactionDraft`. Every address field is resolved before a draft
//! leaves this module - the wallet placeholder never survives drafting -
//! and gas estimation failure degrades to a conservative default rather
//! than failing the request.

pub mod encoder;

use alloy::primitives::{Bytes, U256};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;
use crate::{
    chain::{ChainClient, WalletResolver, WALLET_PLACEHOLDER},
    config::{Config, Registry, VenueConfig, VenueKind},
    config::settings::{DEFAULT_SLIPPAGE_PCT, SWAP_DEADLINE_SECS},
    errors::{AgentError, AgentResult},
    types::{
        ArbitrageOpportunity, CurveRoute, DraftKind, SwapParams, TradeIntent, TransactionDraft,
    },
    utils::math::to_base_units,
};

pub struct Drafter {
    chain: Arc<dyn ChainClient>,
    wallet: WalletResolver,
    registry: Arc<Registry>,
    config: Config,
}

impl Drafter {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        wallet: WalletResolver,
        registry: Arc<Registry>,
        config: Config,
    ) -> Self {
        Self {
            chain,
            wallet,
            registry,
            config,
        }
    }

    /// Drafts from a caller-resolved intent.
    pub async fn draft_from_intent(&self, intent: &TradeIntent) -> AgentResult<TransactionDraft> {
        let draft = match intent {
            TradeIntent::Transfer {
                token: None,
                amount,
                recipient,
            } => {
                let to = self.wallet.resolve(recipient)?;
                let value = to_base_units(*amount, 18).map_err(|e| AgentError::InvalidIntent {
                    reason: format!("bad transfer amount: {e}"),
                })?;
                self.new_draft(DraftKind::EthTransfer, to, value, Bytes::new(), None)
            }
            TradeIntent::Transfer {
                token: Some(symbol),
                amount,
                recipient,
            } => {
                let token = self.require_token(symbol)?;
                let recipient = self.wallet.resolve(recipient)?;
                let units =
                    to_base_units(*amount, token.decimals).map_err(|e| {
                        AgentError::InvalidIntent {
                            reason: format!("bad transfer amount: {e}"),
                        }
                    })?;
                self.new_draft(
                    DraftKind::Erc20Transfer,
                    token.address,
                    U256::ZERO,
                    encoder::encode_erc20_transfer(recipient, units),
                    None,
                )
            }
            TradeIntent::Approve {
                token,
                spender,
                amount,
            } => {
                let token = self.require_token(token)?;
                let spender = self.wallet.resolve(spender)?;
                let units =
                    to_base_units(*amount, token.decimals).map_err(|e| {
                        AgentError::InvalidIntent {
                            reason: format!("bad approve amount: {e}"),
                        }
                    })?;
                self.new_draft(
                    DraftKind::Approve,
                    token.address,
                    U256::ZERO,
                    encoder::encode_erc20_approve(spender, units),
                    None,
                )
            }
            TradeIntent::Swap {
                token_in,
                token_out,
                amount_in,
                expected_out,
                recipient,
                venue,
                slippage_pct,
            } => {
                let venue_id = venue.as_deref().unwrap_or("uniswap_v3");
                let params = self.build_swap_params(
                    venue_id,
                    token_in,
                    token_out,
                    *amount_in,
                    *expected_out,
                    recipient,
                    slippage_pct.unwrap_or(DEFAULT_SLIPPAGE_PCT),
                )?;
                let (to, data, value) = encoder::build_swap_call(&self.registry, &params)?;
                self.new_draft(DraftKind::SimpleSwap, to, value, data, Some(params))
            }
        };

        self.finish(draft).await
    }

    /// Drafts the buy-leg swap of a detected opportunity: spend quote
    /// token on the buy venue, receive the base token into the agent
    /// wallet.
    pub async fn draft_from_opportunity(
        &self,
        opp: &ArbitrageOpportunity,
    ) -> AgentResult<TransactionDraft> {
        let amount_in = opp.trade_size * opp.buy_price;
        let params = self.build_swap_params(
            &opp.buy_venue,
            &opp.pair.quote,
            &opp.pair.base,
            amount_in,
            opp.trade_size,
            WALLET_PLACEHOLDER,
            DEFAULT_SLIPPAGE_PCT,
        )?;
        let (to, data, value) = encoder::build_swap_call(&self.registry, &params)?;
        let draft = self.new_draft(DraftKind::SimpleSwap, to, value, data, Some(params));
        self.finish(draft).await
    }

    #[allow(clippy::too_many_arguments)]
    fn build_swap_params(
        &self,
        venue_id: &str,
        token_in: &str,
        token_out: &str,
        amount_in: Decimal,
        expected_out: Decimal,
        recipient: &str,
        slippage_pct: Decimal,
    ) -> AgentResult<SwapParams> {
        let venue = self
            .registry
            .venue(venue_id)
            .ok_or_else(|| AgentError::InvalidIntent {
                reason: format!("unknown venue {venue_id}"),
            })?;

        // Native ETH rides as call value against the wrapped token.
        let eth_in = token_in.eq_ignore_ascii_case("ETH");
        let in_symbol = if eth_in { "WETH" } else { token_in };

        let token_in_cfg = self.require_token(in_symbol)?;
        let token_out_cfg = self.require_token(token_out)?;
        let recipient = self.wallet.resolve(recipient)?;

        if amount_in <= dec!(0) || expected_out <= dec!(0) {
            return Err(AgentError::InvalidIntent {
                reason: format!(
                    "swap amounts must be positive (in: {amount_in}, expected out: {expected_out})"
                ),
            });
        }

        let to_units = |amount: Decimal, decimals: u32, what: &str| {
            to_base_units(amount, decimals).map_err(|e| AgentError::InvalidIntent {
                reason: format!("bad {what}: {e}"),
            })
        };
        let amount_in_units = to_units(amount_in, token_in_cfg.decimals, "input amount")?;
        let expected_units = to_units(expected_out, token_out_cfg.decimals, "expected output")?;
        let min_out = min_out_units(expected_out, slippage_pct, token_out_cfg.decimals)?;

        let curve_route = match venue.kind {
            VenueKind::Curve => Some(find_curve_route(venue, in_symbol, token_out)?),
            _ => None,
        };

        Ok(SwapParams {
            venue: venue_id.to_string(),
            token_in: token_in_cfg.address,
            token_out: token_out_cfg.address,
            token_in_symbol: token_in_cfg.symbol.clone(),
            token_out_symbol: token_out_cfg.symbol.clone(),
            token_in_decimals: token_in_cfg.decimals,
            token_out_decimals: token_out_cfg.decimals,
            fee_tier: venue.fee_tiers.first().copied(),
            amount_in: amount_in_units,
            expected_out: expected_units,
            min_out,
            slippage_pct,
            recipient,
            deadline: swap_deadline(),
            eth_in,
            curve_route,
        })
    }

    fn require_token(&self, symbol: &str) -> AgentResult<crate::config::TokenConfig> {
        self.registry
            .token(symbol)
            .cloned()
            .ok_or_else(|| AgentError::InvalidIntent {
                reason: format!("token {symbol} not in registry"),
            })
    }

    fn new_draft(
        &self,
        kind: DraftKind,
        to: alloy::primitives::Address,
        value: U256,
        data: Bytes,
        swap_params: Option<SwapParams>,
    ) -> TransactionDraft {
        TransactionDraft {
            id: Uuid::new_v4().to_string(),
            revision: 0,
            kind,
            from: Some(self.wallet.agent_address()),
            to,
            value,
            data,
            estimated_gas: 0,
            gas_estimated: false,
            private_relay: false,
            max_priority_fee_gwei: None,
            swap_params,
        }
    }

    /// Runs the pluggable gas estimator. Estimation failure is recoverable:
    /// the draft keeps the conservative default and is flagged as
    /// unestimated.
    async fn finish(&self, mut draft: TransactionDraft) -> AgentResult<TransactionDraft> {
        match self.chain.estimate_gas(&draft).await {
            Ok(gas) => {
                // 20% headroom over the node's estimate.
                draft.estimated_gas = gas.saturating_add(gas / 5);
                draft.gas_estimated = true;
            }
            Err(e) => {
                warn!(
                    "Gas estimation failed for draft {}, using default {}: {}",
                    draft.id, self.config.default_gas_limit, e
                );
                draft.estimated_gas = self.config.default_gas_limit;
                draft.gas_estimated = false;
            }
        }

        debug!(
            "Drafted {:?} #{} to {} (gas {}, estimated {})",
            draft.kind, draft.id, draft.to, draft.estimated_gas, draft.gas_estimated
        );
        Ok(draft)
    }
}

pub(crate) fn min_out_units(
    expected_out: Decimal,
    slippage_pct: Decimal,
    decimals: u32,
) -> AgentResult<U256> {
    let factor = dec!(1) - slippage_pct / dec!(100);
    if factor <= dec!(0) {
        return Err(AgentError::InvalidIntent {
            reason: format!("slippage tolerance {slippage_pct}% consumes the whole output"),
        });
    }
    to_base_units(expected_out * factor, decimals).map_err(|e| AgentError::InvalidIntent {
        reason: format!("bad minimum output: {e}"),
    })
}

fn swap_deadline() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        + SWAP_DEADLINE_SECS
}

/// Looks up the Curve pool for an in/out symbol pair, in either key
/// orientation, and orients the coin indices from `token_in`.
fn find_curve_route(
    venue: &VenueConfig,
    token_in: &str,
    token_out: &str,
) -> AgentResult<CurveRoute> {
    let forward = format!("{}/{}", token_out.to_uppercase(), token_in.to_uppercase());
    if let Some(pool) = venue.curve_pools.get(&forward) {
        // Key is BASE/QUOTE and we spend the quote side.
        return Ok(CurveRoute {
            pool: pool.address,
            i: pool.quote_index,
            j: pool.base_index,
        });
    }

    let reverse = format!("{}/{}", token_in.to_uppercase(), token_out.to_uppercase());
    if let Some(pool) = venue.curve_pools.get(&reverse) {
        return Ok(CurveRoute {
            pool: pool.address,
            i: pool.base_index,
            j: pool.quote_index,
        });
    }

    Err(AgentError::InvalidIntent {
        reason: format!("no curve pool for {token_in}->{token_out}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::str::FromStr;
    use crate::chain::SimulationOutcome;
    use crate::types::TokenPair;

    struct StubChain {
        gas: AgentResult<u64>,
    }

    #[async_trait]
    impl ChainClient for StubChain {
        async fn call(&self, _to: Address, _data: Bytes) -> AgentResult<Bytes> {
            Ok(Bytes::new())
        }

        async fn estimate_gas(&self, _draft: &TransactionDraft) -> AgentResult<u64> {
            match &self.gas {
                Ok(gas) => Ok(*gas),
                Err(_) => Err(AgentError::Network {
                    message: "estimator offline".to_string(),
                    source: None,
                    retry_count: 0,
                }),
            }
        }

        async fn get_balance(
            &self,
            _address: Address,
            _token: Option<Address>,
        ) -> AgentResult<U256> {
            Ok(U256::ZERO)
        }

        async fn gas_price(&self) -> AgentResult<u128> {
            Ok(0)
        }

        async fn simulate(&self, _draft: &TransactionDraft) -> AgentResult<SimulationOutcome> {
            Ok(SimulationOutcome {
                success: true,
                asset_changes: Default::default(),
                gas_used: None,
                revert_reason: None,
            })
        }

        async fn submit(&self, _draft: &TransactionDraft) -> AgentResult<String> {
            Ok("0x0".to_string())
        }
    }

    fn agent_address() -> Address {
        Address::from_str("0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B").unwrap()
    }

    fn drafter(gas: AgentResult<u64>) -> Drafter {
        Drafter::new(
            Arc::new(StubChain { gas }),
            WalletResolver::new(agent_address()),
            Arc::new(Registry::mainnet()),
            Config::load(),
        )
    }

    fn swap_intent(recipient: &str) -> TradeIntent {
        TradeIntent::Swap {
            token_in: "USDC".to_string(),
            token_out: "WETH".to_string(),
            amount_in: rust_decimal_macros::dec!(3250),
            expected_out: rust_decimal_macros::dec!(1),
            recipient: recipient.to_string(),
            venue: None,
            slippage_pct: None,
        }
    }

    #[tokio::test]
    async fn swap_draft_resolves_placeholder_recipient() {
        let drafter = drafter(Ok(120_000));
        let draft = drafter
            .draft_from_intent(&swap_intent(WALLET_PLACEHOLDER))
            .await
            .unwrap();

        let params = draft.swap_params.as_ref().unwrap();
        assert_eq!(params.recipient, agent_address());
        assert_eq!(draft.from, Some(agent_address()));
        assert!(draft.gas_estimated);
        // 20% buffer over the node estimate.
        assert_eq!(draft.estimated_gas, 144_000);
    }

    #[tokio::test]
    async fn gas_estimate_failure_falls_back_to_default() {
        let drafter = drafter(Err(AgentError::Cancelled));
        let draft = drafter
            .draft_from_intent(&swap_intent(WALLET_PLACEHOLDER))
            .await
            .unwrap();

        assert!(!draft.gas_estimated);
        assert_eq!(draft.estimated_gas, Config::load().default_gas_limit);
    }

    #[tokio::test]
    async fn eth_transfer_draft_carries_value_only() {
        let drafter = drafter(Ok(21_000));
        let draft = drafter
            .draft_from_intent(&TradeIntent::Transfer {
                token: None,
                amount: rust_decimal_macros::dec!(0.5),
                recipient: "0x2222222222222222222222222222222222222222".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(draft.kind, DraftKind::EthTransfer);
        assert_eq!(draft.value, U256::from(500_000_000_000_000_000u128));
        assert!(draft.data.is_empty());
    }

    #[tokio::test]
    async fn unknown_token_is_invalid_intent() {
        let drafter = drafter(Ok(21_000));
        let err = drafter
            .draft_from_intent(&TradeIntent::Transfer {
                token: Some("WBTC".to_string()),
                amount: rust_decimal_macros::dec!(1),
                recipient: WALLET_PLACEHOLDER.to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidIntent { .. }));
    }

    #[tokio::test]
    async fn opportunity_draft_spends_quote_on_buy_venue() {
        let drafter = drafter(Ok(150_000));
        let opp = ArbitrageOpportunity {
            id: "test".to_string(),
            timestamp: Utc::now(),
            pair: TokenPair::new("WETH", "USDC"),
            buy_venue: "sushiswap".to_string(),
            sell_venue: "uniswap_v3".to_string(),
            buy_price: rust_decimal_macros::dec!(3245.50),
            sell_price: rust_decimal_macros::dec!(3262.75),
            gross_profit_pct: rust_decimal_macros::dec!(0.53),
            estimated_gas_cost: rust_decimal_macros::dec!(0.001),
            net_profit_pct: rust_decimal_macros::dec!(0.43),
            trade_size: rust_decimal_macros::dec!(1),
        };

        let draft = drafter.draft_from_opportunity(&opp).await.unwrap();
        let params = draft.swap_params.as_ref().unwrap();

        assert_eq!(params.venue, "sushiswap");
        assert_eq!(params.token_in, crate::config::USDC_MAINNET);
        assert_eq!(params.token_out, crate::config::WETH_MAINNET);
        // 1 WETH at 3245.50 spends 3245.50 USDC.
        assert_eq!(params.amount_in, U256::from(3_245_500_000u64));
        assert_eq!(params.recipient, agent_address());
        assert_eq!(draft.to, crate::config::SUSHISWAP_ROUTER);
    }
}
