//! 1inch aggregator API adapter

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use crate::{
    config::Registry,
    errors::{AgentError, AgentResult},
    types::{Quote, TokenPair},
    utils::math::pow10,
};
use super::{sanity_check_price, VenueAdapter};

const VENUE_ID: &str = "oneinch";

/// Quotes through the 1inch HTTP API rather than an on-chain call. The
/// aggregated route makes this venue quote-only: drafting never targets it.
pub struct OneInchAdapter {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    registry: Arc<Registry>,
}

impl OneInchAdapter {
    pub fn new(
        api_base: String,
        api_key: Option<String>,
        registry: Arc<Registry>,
        timeout_ms: u64,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_base,
            api_key,
            registry,
        }
    }
}

#[async_trait]
impl VenueAdapter for OneInchAdapter {
    fn venue_id(&self) -> &str {
        VENUE_ID
    }

    async fn fetch_quote(&self, pair: &TokenPair) -> AgentResult<Quote> {
        let started = Instant::now();
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

        let amount_in = 10u128.pow(base.decimals);
        let url = format!(
            "{}/quote?src={}&dst={}&amount={}",
            self.api_base, base.address, quote_token.address, amount_in
        );

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| unavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(unavailable(format!("API error {status}: {body}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| unavailable(format!("malformed response: {e}")))?;

        let dst_amount = json["dstAmount"]
            .as_str()
            .ok_or_else(|| unavailable("missing dstAmount field".to_string()))?;

        let raw_out = Decimal::from_str(dst_amount).map_err(|e| AgentError::DataParsing {
            context: format!("oneinch dstAmount for {pair}"),
            source: e.into(),
        })?;

        let price = raw_out / pow10(quote_token.decimals);
        sanity_check_price(VENUE_ID, pair, price)?;

        debug!("oneinch {} = {}", pair, price);
        Ok(Quote::new(VENUE_ID, pair.clone(), price)
            .with_latency(started.elapsed().as_millis() as u64))
    }
}
