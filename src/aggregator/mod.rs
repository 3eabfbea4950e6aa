//! Price aggregation across venues
//!
//! Fans out to every configured adapter concurrently, joins under an
//! overall deadline, and tolerates partial failure: a venue timing out or
//! erroring is excluded from the result, never escalated. An empty result
//! means "insufficient data" to callers, not a crash.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use crate::{
    config::Config,
    types::{Quote, TokenPair},
    utils::cancel::CancelToken,
    venues::VenueAdapter,
};

#[derive(Debug, Clone)]
pub struct FetchLimits {
    /// Budget for a single venue; a venue exceeding it is dropped without
    /// blocking the others.
    pub venue_timeout: Duration,
    /// Budget for the whole fan-out.
    pub overall_deadline: Duration,
}

impl FetchLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            venue_timeout: Duration::from_millis(config.venue_timeout_ms),
            overall_deadline: Duration::from_millis(config.fetch_deadline_ms),
        }
    }
}

/// Fetches quotes for `pair` from all adapters. Returns the successful
/// quotes sorted by venue id; empty when every venue fails. No retry
/// happens here - that belongs to the transport layer under the chain
/// client.
pub async fn fetch_all(
    pair: &TokenPair,
    adapters: &[Arc<dyn VenueAdapter>],
    limits: &FetchLimits,
    cancel: &CancelToken,
) -> Vec<Quote> {
    let mut set = JoinSet::new();

    for adapter in adapters {
        let adapter = adapter.clone();
        let pair = pair.clone();
        let venue_timeout = limits.venue_timeout;
        set.spawn(async move {
            let venue = adapter.venue_id().to_string();
            match tokio::time::timeout(venue_timeout, adapter.fetch_quote(&pair)).await {
                Ok(Ok(quote)) => Some(quote),
                Ok(Err(e)) => {
                    warn!("Venue {} dropped from aggregation: {}", venue, e);
                    None
                }
                Err(_) => {
                    warn!(
                        "Venue {} exceeded its {}ms budget, excluded",
                        venue,
                        venue_timeout.as_millis()
                    );
                    None
                }
            }
        });
    }

    let mut quotes = Vec::new();
    let deadline = tokio::time::sleep(limits.overall_deadline);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            joined = set.join_next() => {
                match joined {
                    Some(Ok(Some(quote))) => quotes.push(quote),
                    Some(Ok(None)) => {}
                    Some(Err(e)) => warn!("Venue fetch task panicked: {}", e),
                    None => break,
                }
            }
            _ = &mut deadline => {
                warn!(
                    "Aggregation deadline hit with {} venue(s) still pending",
                    set.len()
                );
                set.abort_all();
                break;
            }
            _ = cancel.cancelled() => {
                debug!("Aggregation cancelled for {}", pair);
                set.abort_all();
                break;
            }
        }
    }

    quotes.sort_by(|a, b| a.venue_id.cmp(&b.venue_id));
    quotes
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use crate::errors::{AgentError, AgentResult};

    struct StubVenue {
        id: &'static str,
        price: Option<Decimal>,
        delay: Duration,
    }

    #[async_trait]
    impl VenueAdapter for StubVenue {
        fn venue_id(&self) -> &str {
            self.id
        }

        async fn fetch_quote(&self, pair: &TokenPair) -> AgentResult<Quote> {
            tokio::time::sleep(self.delay).await;
            match self.price {
                Some(price) => Ok(Quote::new(self.id, pair.clone(), price)),
                None => Err(AgentError::VenueUnavailable {
                    venue: self.id.to_string(),
                    reason: "stubbed outage".to_string(),
                }),
            }
        }
    }

    fn limits() -> FetchLimits {
        FetchLimits {
            venue_timeout: Duration::from_millis(50),
            overall_deadline: Duration::from_millis(200),
        }
    }

    fn adapters(stubs: Vec<StubVenue>) -> Vec<Arc<dyn VenueAdapter>> {
        stubs
            .into_iter()
            .map(|s| Arc::new(s) as Arc<dyn VenueAdapter>)
            .collect()
    }

    #[tokio::test]
    async fn one_timeout_still_yields_the_other_quotes() {
        let adapters = adapters(vec![
            StubVenue { id: "alpha", price: Some(dec!(3245.50)), delay: Duration::ZERO },
            StubVenue { id: "bravo", price: Some(dec!(3262.75)), delay: Duration::ZERO },
            StubVenue { id: "charlie", price: Some(dec!(3250)), delay: Duration::from_millis(500) },
        ]);

        let pair = TokenPair::new("WETH", "USDC");
        let quotes = fetch_all(&pair, &adapters, &limits(), &CancelToken::never()).await;

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].venue_id, "alpha");
        assert_eq!(quotes[1].venue_id, "bravo");
    }

    #[tokio::test]
    async fn all_venues_failing_returns_empty_not_error() {
        let adapters = adapters(vec![
            StubVenue { id: "alpha", price: None, delay: Duration::ZERO },
            StubVenue { id: "bravo", price: None, delay: Duration::ZERO },
        ]);

        let pair = TokenPair::new("WETH", "USDC");
        let quotes = fetch_all(&pair, &adapters, &limits(), &CancelToken::never()).await;
        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn cancellation_stops_the_fan_out() {
        let adapters = adapters(vec![StubVenue {
            id: "alpha",
            price: Some(dec!(1)),
            delay: Duration::from_millis(100),
        }]);

        let (handle, token) = crate::utils::cancel::cancel_pair();
        handle.cancel();

        let pair = TokenPair::new("WETH", "USDC");
        let quotes = fetch_all(&pair, &adapters, &limits(), &token).await;
        assert!(quotes.is_empty());
    }
}
