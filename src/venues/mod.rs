//! Price source adapters
//!
//! One adapter per liquidity venue, each normalizing that venue's quoting
//! mechanism into a common `Quote`. Adapters are stateless per call and
//! independent of one another; the aggregator owns fan-out and timeouts.

pub mod uniswap_v3;
pub mod sushiswap;
pub mod curve;
pub mod oneinch;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use crate::{
    chain::ChainClient,
    config::{Config, Registry},
    errors::{AgentError, AgentResult},
    types::{Quote, TokenPair},
};

pub use curve::CurveAdapter;
pub use oneinch::OneInchAdapter;
pub use sushiswap::SushiSwapAdapter;
pub use uniswap_v3::UniswapV3Adapter;

#[async_trait]
pub trait VenueAdapter: Send + Sync {
    fn venue_id(&self) -> &str;

    /// Fetches one quote for the pair. Failure is per-venue and non-fatal;
    /// the aggregator records it as absent.
    async fn fetch_quote(&self, pair: &TokenPair) -> AgentResult<Quote>;
}

/// Rejects obviously broken venue responses at the adapter boundary.
pub(crate) fn sanity_check_price(
    venue_id: &str,
    pair: &TokenPair,
    price: Decimal,
) -> AgentResult<()> {
    if price <= dec!(0) {
        return Err(AgentError::VenueUnavailable {
            venue: venue_id.to_string(),
            reason: format!("non-positive price {price} for {pair}"),
        });
    }
    Ok(())
}

/// Builds every adapter the registry configures.
pub fn build_adapters(
    chain: Arc<dyn ChainClient>,
    registry: Arc<Registry>,
    config: &Config,
) -> Vec<Arc<dyn VenueAdapter>> {
    let mut adapters: Vec<Arc<dyn VenueAdapter>> = vec![
        Arc::new(UniswapV3Adapter::new(chain.clone(), registry.clone())),
        Arc::new(SushiSwapAdapter::new(chain.clone(), registry.clone())),
        Arc::new(CurveAdapter::new(chain, registry.clone())),
    ];

    if let Some(venue) = registry.venue("oneinch") {
        if let Some(api_base) = &venue.api_base {
            adapters.push(Arc::new(OneInchAdapter::new(
                api_base.clone(),
                config.oneinch_api_key.clone(),
                registry.clone(),
                config.venue_timeout_ms,
            )));
        }
    }

    adapters
}
