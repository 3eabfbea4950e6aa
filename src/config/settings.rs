//! Agent configuration settings and environment variable handling

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use crate::types::TokenPair;

// Configuration bounds
pub const MIN_TRADE_SIZE: Decimal = dec!(0.01);
pub const MAX_TRADE_SIZE: Decimal = dec!(10.0);
pub const MIN_PROFIT_PCT_FLOOR: Decimal = dec!(0.05);
pub const MAX_SLIPPAGE_PCT_CEILING: Decimal = dec!(2.0);
pub const MAX_RETRIES_CEILING: u32 = 10;

// Drafting constants
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;
pub const DEFAULT_SLIPPAGE_PCT: Decimal = dec!(0.5);
pub const SWAP_DEADLINE_SECS: u64 = 1200;

// Evaluation constants
pub const ONE_ETH_WEI: u128 = 1_000_000_000_000_000_000;
pub const PRIVATE_RELAY_PRIORITY_FEE_GWEI: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    // Arbitrage thresholds
    pub trade_size: Decimal,
    pub min_profit_pct: Decimal,
    /// Flat gas estimate in base token units, subtracted from gross profit.
    pub gas_cost_estimate: Decimal,
    // Aggregation
    pub venue_timeout_ms: u64,
    pub fetch_deadline_ms: u64,
    // Evaluation loop
    pub max_retries: u32,
    pub max_slippage_pct: Decimal,
    pub default_gas_limit: u64,
    // Monitoring loop
    pub pairs: Vec<TokenPair>,
    pub scan_interval_secs: u64,
    pub max_consecutive_errors: u32,
    pub circuit_breaker_cooldown_secs: u64,
    // Credentials
    pub rpc_url: Option<String>,
    pub alchemy_api_key: Option<String>,
    pub oneinch_api_key: Option<String>,
    pub agent_address: Option<String>,
    pub private_key: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            trade_size: env::var("TRADE_SIZE")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok())
                .unwrap_or(dec!(1.0))
                .max(MIN_TRADE_SIZE)
                .min(MAX_TRADE_SIZE),
            min_profit_pct: env::var("MIN_PROFIT_PERCENTAGE")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok())
                .unwrap_or(dec!(0.5))
                .max(MIN_PROFIT_PCT_FLOOR),
            gas_cost_estimate: env::var("GAS_COST_ESTIMATE")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok())
                .unwrap_or(dec!(0.01))
                .max(dec!(0)),
            venue_timeout_ms: env::var("VENUE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3_000),
            fetch_deadline_ms: env::var("FETCH_DEADLINE_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8_000),
            max_retries: env::var("MAX_REVISION_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3)
                .min(MAX_RETRIES_CEILING),
            max_slippage_pct: env::var("MAX_SLIPPAGE_PCT")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok())
                .unwrap_or(MAX_SLIPPAGE_PCT_CEILING)
                .min(MAX_SLIPPAGE_PCT_CEILING),
            default_gas_limit: env::var("DEFAULT_GAS_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_GAS_LIMIT),
            pairs: env::var("PAIRS")
                .ok()
                .map(|raw| {
                    raw.split(',')
                        .filter_map(|p| TokenPair::from_str(p.trim()).ok())
                        .collect::<Vec<_>>()
                })
                .filter(|pairs| !pairs.is_empty())
                .unwrap_or_else(|| vec![TokenPair::new("WETH", "USDC")]),
            scan_interval_secs: env::var("SCAN_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            max_consecutive_errors: 5,
            circuit_breaker_cooldown_secs: 300, // 5 minutes
            rpc_url: env::var("RPC_URL").ok(),
            alchemy_api_key: env::var("ALCHEMY_API_KEY").ok(),
            oneinch_api_key: env::var("ONEINCH_API_KEY").ok(),
            agent_address: env::var("AGENT_ADDRESS").ok(),
            private_key: env::var("AGENT_ETH_KEY").ok(),
        }
    }
}
