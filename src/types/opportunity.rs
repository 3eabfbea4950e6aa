//! Arbitrage opportunity types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use super::TokenPair;

/// A detected buy-low/sell-high pairing across two venues.
///
/// Invariants upheld by the detector: `buy_price < sell_price` and
/// `net_profit_pct == gross_profit_pct - gas cost expressed as a percentage
/// of the trade notional`, computed in `Decimal` end to end.
#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageOpportunity {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub pair: TokenPair,
    pub buy_venue: String,
    pub sell_venue: String,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub gross_profit_pct: Decimal,
    /// Flat gas estimate in base token units, as supplied by the caller.
    pub estimated_gas_cost: Decimal,
    pub net_profit_pct: Decimal,
    /// Probe trade size in base token units.
    pub trade_size: Decimal,
}
