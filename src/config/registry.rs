//! Venue and token registry tables
//!
//! Immutable snapshot of the address book: venue routing/quoting contracts
//! and token metadata. Components receive a `&Registry` explicitly per call
//! instead of reading ambient state, so concurrent evaluation criteria can
//! never observe the tables mid-change.

use alloy::primitives::{Address, address};
use lazy_static::lazy_static;
use std::collections::HashMap;
use crate::types::TokenPair;

// Mainnet token addresses
pub const WETH_MAINNET: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
pub const USDC_MAINNET: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
pub const USDT_MAINNET: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");
pub const DAI_MAINNET: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");

// Uniswap V3
pub const UNISWAP_V3_QUOTER: Address = address!("b27308f9F90D607463bb33eA1BeBb41C27CE5AB6");
pub const UNISWAP_V3_ROUTER: Address = address!("E592427A0AEce92De3Edee1F18E0157C05861564");

// SushiSwap (Uniswap V2 fork)
pub const SUSHISWAP_ROUTER: Address = address!("d9e1cE17f2641f24aE83637ab66a2cca9C378B9F");
pub const SUSHI_WETH_USDC_PAIR: Address = address!("397FF1542f962076d0BFE58eA045FfA2d347ACa0");
pub const SUSHI_WETH_USDT_PAIR: Address = address!("06da0fd433C1A5d7a4faa01111c044910A184553");
pub const SUSHI_WETH_DAI_PAIR: Address = address!("C3D03e4F041Fd4cD388c549Ee2A29a9E5075882f");

// Curve tricrypto2 (USDT/WBTC/WETH)
pub const CURVE_TRICRYPTO2_POOL: Address = address!("D51a44d3FaE010294C616388b506AcdA1bfAAE46");

pub const ONEINCH_API_BASE: &str = "https://api.1inch.dev/swap/v6.0/1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueKind {
    UniswapV3,
    SushiSwap,
    Curve,
    OneInch,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: Address,
    pub decimals: u32,
}

/// Per-pair Curve pool coordinates: pool address plus the coin indices of
/// the base and quote tokens within that pool.
#[derive(Debug, Clone, Copy)]
pub struct CurvePool {
    pub address: Address,
    pub base_index: u8,
    pub quote_index: u8,
}

#[derive(Debug, Clone)]
pub struct VenueConfig {
    pub id: String,
    pub kind: VenueKind,
    pub router: Option<Address>,
    pub quoter: Option<Address>,
    /// V2-style pair contracts keyed by pair string.
    pub pairs: HashMap<String, Address>,
    pub curve_pools: HashMap<String, CurvePool>,
    pub fee_tiers: Vec<u32>,
    pub api_base: Option<String>,
}

impl VenueConfig {
    fn new(id: &str, kind: VenueKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            router: None,
            quoter: None,
            pairs: HashMap::new(),
            curve_pools: HashMap::new(),
            fee_tiers: Vec::new(),
            api_base: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    tokens: HashMap<String, TokenConfig>,
    venues: HashMap<String, VenueConfig>,
}

impl Registry {
    pub fn mainnet() -> Self {
        MAINNET_REGISTRY.clone()
    }

    pub fn token(&self, symbol: &str) -> Option<&TokenConfig> {
        self.tokens.get(&symbol.to_uppercase())
    }

    pub fn venue(&self, id: &str) -> Option<&VenueConfig> {
        self.venues.get(id)
    }

    pub fn venue_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.venues.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Builds a registry from explicit tables, for tests and alternative
    /// deployments.
    pub fn from_parts(tokens: Vec<TokenConfig>, venues: Vec<VenueConfig>) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| (t.symbol.to_uppercase(), t))
                .collect(),
            venues: venues.into_iter().map(|v| (v.id.clone(), v)).collect(),
        }
    }

    pub fn pair_key(pair: &TokenPair) -> String {
        format!("{}/{}", pair.base, pair.quote)
    }
}

fn token(symbol: &str, address: Address, decimals: u32) -> TokenConfig {
    TokenConfig {
        symbol: symbol.to_string(),
        address,
        decimals,
    }
}

lazy_static! {
    static ref MAINNET_REGISTRY: Registry = {
        let tokens = vec![
            token("WETH", WETH_MAINNET, 18),
            token("USDC", USDC_MAINNET, 6),
            token("USDT", USDT_MAINNET, 6),
            token("DAI", DAI_MAINNET, 18),
        ];

        let mut uniswap = VenueConfig::new("uniswap_v3", VenueKind::UniswapV3);
        uniswap.router = Some(UNISWAP_V3_ROUTER);
        uniswap.quoter = Some(UNISWAP_V3_QUOTER);
        uniswap.fee_tiers = vec![500, 3000, 10000];

        let mut sushi = VenueConfig::new("sushiswap", VenueKind::SushiSwap);
        sushi.router = Some(SUSHISWAP_ROUTER);
        sushi.pairs = HashMap::from([
            ("WETH/USDC".to_string(), SUSHI_WETH_USDC_PAIR),
            ("WETH/USDT".to_string(), SUSHI_WETH_USDT_PAIR),
            ("WETH/DAI".to_string(), SUSHI_WETH_DAI_PAIR),
        ]);

        let mut curve = VenueConfig::new("curve", VenueKind::Curve);
        curve.curve_pools = HashMap::from([(
            "WETH/USDT".to_string(),
            CurvePool {
                address: CURVE_TRICRYPTO2_POOL,
                base_index: 2,
                quote_index: 0,
            },
        )]);

        let mut oneinch = VenueConfig::new("oneinch", VenueKind::OneInch);
        oneinch.api_base = Some(ONEINCH_API_BASE.to_string());

        Registry::from_parts(tokens, vec![uniswap, sushi, curve, oneinch])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_tables_resolve() {
        let registry = Registry::mainnet();
        assert_eq!(registry.token("weth").unwrap().decimals, 18);
        assert_eq!(registry.token("USDC").unwrap().decimals, 6);
        assert!(registry.token("WBTC").is_none());

        let ids = registry.venue_ids();
        assert_eq!(ids, vec!["curve", "oneinch", "sushiswap", "uniswap_v3"]);

        let sushi = registry.venue("sushiswap").unwrap();
        assert!(sushi.pairs.contains_key("WETH/USDC"));
    }
}
