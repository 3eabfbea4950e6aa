//! Venue quote types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use super::TokenPair;

/// A single price observation for a token pair from one venue.
///
/// Immutable once produced; quotes are consumed by the detector and then
/// discarded, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub venue_id: String,
    pub pair: TokenPair,
    /// Quote token per one base token.
    pub price: Decimal,
    /// Rough depth indicator in base token units, when the venue exposes one.
    pub liquidity_hint: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
    pub source_latency_ms: u64,
}

impl Quote {
    pub fn new(venue_id: impl Into<String>, pair: TokenPair, price: Decimal) -> Self {
        Self {
            venue_id: venue_id.into(),
            pair,
            price,
            liquidity_hint: None,
            timestamp: Utc::now(),
            source_latency_ms: 0,
        }
    }

    pub fn with_liquidity(mut self, hint: Decimal) -> Self {
        self.liquidity_hint = Some(hint);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.source_latency_ms = latency_ms;
        self
    }
}
