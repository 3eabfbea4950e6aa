//! SushiSwap (V2-style) reserves adapter

use alloy::primitives::U256;
use alloy::sol_types::SolValue;
use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use crate::{
    chain::ChainClient,
    config::Registry,
    errors::{AgentError, AgentResult},
    types::{Quote, TokenPair},
    utils::abi,
    utils::math::from_base_units,
};
use super::{sanity_check_price, VenueAdapter};

const VENUE_ID: &str = "sushiswap";

/// Derives the spot price from the pair contract's reserves. V2 pairs
/// store token0/token1 sorted by address, so reserve order follows the
/// numeric ordering of the two token addresses.
pub struct SushiSwapAdapter {
    chain: Arc<dyn ChainClient>,
    registry: Arc<Registry>,
}

impl SushiSwapAdapter {
    pub fn new(chain: Arc<dyn ChainClient>, registry: Arc<Registry>) -> Self {
        Self { chain, registry }
    }
}

#[async_trait]
impl VenueAdapter for SushiSwapAdapter {
    fn venue_id(&self) -> &str {
        VENUE_ID
    }

    async fn fetch_quote(&self, pair: &TokenPair) -> AgentResult<Quote> {
        let started = Instant::now();
        let unavailable = |reason: String| AgentError::VenueUnavailable {
            venue: VENUE_ID.to_string(),
            reason,
        };

        let venue = self
            .registry
            .venue(VENUE_ID)
            .ok_or_else(|| unavailable("venue not configured".to_string()))?;
        let pair_address = venue
            .pairs
            .get(&Registry::pair_key(pair))
            .copied()
            .ok_or_else(|| unavailable(format!("no pair contract for {pair}")))?;

        let base = self
            .registry
            .token(&pair.base)
            .ok_or_else(|| unavailable(format!("unknown token {}", pair.base)))?;
        let quote_token = self
            .registry
            .token(&pair.quote)
            .ok_or_else(|| unavailable(format!("unknown token {}", pair.quote)))?;

        let data = abi::selector("getReserves()");
        let raw = self
            .chain
            .call(pair_address, data.into())
            .await
            .map_err(|e| unavailable(format!("getReserves failed: {e}")))?;

        let (r0, r1, _ts) = <(U256, U256, U256)>::abi_decode(&raw, true).map_err(|e| {
            AgentError::DataParsing {
                context: format!("sushiswap reserves for {pair}"),
                source: e.into(),
            }
        })?;

        if r0 == U256::ZERO || r1 == U256::ZERO {
            return Err(unavailable(format!("pair {pair} has zero reserves")));
        }

        let (base_reserve, quote_reserve) = if base.address < quote_token.address {
            (r0, r1)
        } else {
            (r1, r0)
        };

        let parse = |units: U256, decimals: u32, side: &str| {
            from_base_units(units, decimals).map_err(|e| AgentError::DataParsing {
                context: format!("sushiswap {side} reserve for {pair}"),
                source: e,
            })
        };
        let base_amount = parse(base_reserve, base.decimals, "base")?;
        let quote_amount = parse(quote_reserve, quote_token.decimals, "quote")?;

        if base_amount == dec!(0) {
            return Err(unavailable(format!("pair {pair} base reserve rounds to zero")));
        }

        let price = quote_amount / base_amount;
        sanity_check_price(VENUE_ID, pair, price)?;

        debug!("sushiswap {} = {} ({} base units deep)", pair, price, base_amount);
        Ok(Quote::new(VENUE_ID, pair.clone(), price)
            .with_liquidity(base_amount)
            .with_latency(started.elapsed().as_millis() as u64))
    }
}
