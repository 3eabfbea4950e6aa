//! Curve pool adapter

use alloy::primitives::U256;
use alloy::sol_types::SolValue;
use async_trait::async_trait;
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

const VENUE_ID: &str = "curve";

/// Asks the pool how much quote token `get_dy` returns for one base token.
/// Coin indices come from the registry since Curve pools are positional.
pub struct CurveAdapter {
    chain: Arc<dyn ChainClient>,
    registry: Arc<Registry>,
}

impl CurveAdapter {
    pub fn new(chain: Arc<dyn ChainClient>, registry: Arc<Registry>) -> Self {
        Self { chain, registry }
    }
}

#[async_trait]
impl VenueAdapter for CurveAdapter {
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
        let pool = venue
            .curve_pools
            .get(&Registry::pair_key(pair))
            .copied()
            .ok_or_else(|| unavailable(format!("no pool for {pair}")))?;

        let base = self
            .registry
            .token(&pair.base)
            .ok_or_else(|| unavailable(format!("unknown token {}", pair.base)))?;
        let quote_token = self
            .registry
            .token(&pair.quote)
            .ok_or_else(|| unavailable(format!("unknown token {}", pair.quote)))?;

        let dx = U256::from(10u8).pow(U256::from(base.decimals));
        let mut data = abi::selector("get_dy(uint256,uint256,uint256)");
        abi::append_u256(&mut data, U256::from(pool.base_index));
        abi::append_u256(&mut data, U256::from(pool.quote_index));
        abi::append_u256(&mut data, dx);

        let raw = self
            .chain
            .call(pool.address, data.into())
            .await
            .map_err(|e| unavailable(format!("get_dy failed: {e}")))?;

        let dy = U256::abi_decode(&raw, true).map_err(|e| AgentError::DataParsing {
            context: format!("curve get_dy for {pair}"),
            source: e.into(),
        })?;

        if dy == U256::ZERO {
            return Err(unavailable(format!("pool returned zero output for {pair}")));
        }

        let price = from_base_units(dy, quote_token.decimals).map_err(|e| {
            AgentError::DataParsing {
                context: format!("curve quote for {pair}"),
                source: e,
            }
        })?;
        sanity_check_price(VENUE_ID, pair, price)?;

        debug!("curve {} = {}", pair, price);
        Ok(Quote::new(VENUE_ID, pair.clone(), price)
            .with_latency(started.elapsed().as_millis() as u64))
    }
}
