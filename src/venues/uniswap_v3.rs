//! Uniswap V3 quoter adapter

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

const VENUE_ID: &str = "uniswap_v3";

/// Quotes one base-token unit through the Quoter contract, probing the
/// configured fee tiers in order and taking the first pool that answers.
pub struct UniswapV3Adapter {
    chain: Arc<dyn ChainClient>,
    registry: Arc<Registry>,
}

impl UniswapV3Adapter {
    pub fn new(chain: Arc<dyn ChainClient>, registry: Arc<Registry>) -> Self {
        Self { chain, registry }
    }
}

pub(crate) fn encode_quote_exact_input_single(
    token_in: alloy::primitives::Address,
    token_out: alloy::primitives::Address,
    fee: u32,
    amount_in: U256,
) -> Vec<u8> {
    let mut data =
        abi::selector("quoteExactInputSingle(address,address,uint24,uint256,uint160)");
    abi::append_address(&mut data, token_in);
    abi::append_address(&mut data, token_out);
    abi::append_u256(&mut data, U256::from(fee));
    abi::append_u256(&mut data, amount_in);
    abi::append_u256(&mut data, U256::ZERO); // sqrtPriceLimitX96: no limit
    data
}

#[async_trait]
impl VenueAdapter for UniswapV3Adapter {
    fn venue_id(&self) -> &str {
        VENUE_ID
    }

    async fn fetch_quote(&self, pair: &TokenPair) -> AgentResult<Quote> {
        let started = Instant::now();

        let venue = self.registry.venue(VENUE_ID).ok_or_else(|| {
            AgentError::VenueUnavailable {
                venue: VENUE_ID.to_string(),
                reason: "venue not configured".to_string(),
            }
        })?;
        let quoter = venue.quoter.ok_or_else(|| AgentError::VenueUnavailable {
            venue: VENUE_ID.to_string(),
            reason: "no quoter address configured".to_string(),
        })?;

        let unavailable = |reason: String| AgentError::VenueUnavailable {
            venue: VENUE_ID.to_string(),
            reason,
        };
        let base = self
            .registry
            .token(&pair.base)
            .ok_or_else(|| unavailable(format!("unknown token {}", pair.base)))?;
        let quote_token = self
            .registry
            .token(&pair.quote)
            .ok_or_else(|| unavailable(format!("unknown token {}", pair.quote)))?;

        // Quote exactly one base token so amount_out IS the price.
        let amount_in = U256::from(1u8) * U256::from(10u8).pow(U256::from(base.decimals));

        for fee in &venue.fee_tiers {
            let data =
                encode_quote_exact_input_single(base.address, quote_token.address, *fee, amount_in);

            let raw = match self.chain.call(quoter, data.into()).await {
                Ok(raw) => raw,
                Err(e) => {
                    debug!("uniswap_v3 tier {} reverted for {}: {}", fee, pair, e);
                    continue;
                }
            };

            let amount_out = match U256::abi_decode(&raw, true) {
                Ok(out) if out > U256::ZERO => out,
                _ => continue,
            };

            let price = from_base_units(amount_out, quote_token.decimals).map_err(|e| {
                AgentError::DataParsing {
                    context: format!("uniswap_v3 quote for {pair}"),
                    source: e,
                }
            })?;
            sanity_check_price(VENUE_ID, pair, price)?;

            debug!("uniswap_v3 {} tier {} = {}", pair, fee, price);
            return Ok(Quote::new(VENUE_ID, pair.clone(), price)
                .with_latency(started.elapsed().as_millis() as u64));
        }

        Err(AgentError::VenueUnavailable {
            venue: VENUE_ID.to_string(),
            reason: format!("no pool answered for {pair} across fee tiers"),
        })
    }
}
