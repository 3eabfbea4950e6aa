//! Calldata encoding for drafts
//!
//! Hand-rolled ABI encoding from function signatures and 32-byte words,
//! the same way quoting calls are built.

use alloy::primitives::{Address, Bytes, U256};
use crate::{
    config::{Registry, VenueKind},
    errors::{AgentError, AgentResult},
    types::SwapParams,
    utils::abi,
};

pub fn encode_erc20_transfer(recipient: Address, amount: U256) -> Bytes {
    let mut data = abi::selector("transfer(address,uint256)");
    abi::append_address(&mut data, recipient);
    abi::append_u256(&mut data, amount);
    data.into()
}

pub fn encode_erc20_approve(spender: Address, amount: U256) -> Bytes {
    let mut data = abi::selector("approve(address,uint256)");
    abi::append_address(&mut data, spender);
    abi::append_u256(&mut data, amount);
    data.into()
}

/// Uniswap V3 `exactInputSingle` over the params struct. The struct is
/// fully static, so it encodes as eight inline words.
fn encode_v3_exact_input_single(params: &SwapParams, fee: u32) -> Bytes {
    let mut data = abi::selector(
        "exactInputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))",
    );
    abi::append_address(&mut data, params.token_in);
    abi::append_address(&mut data, params.token_out);
    abi::append_u256(&mut data, U256::from(fee));
    abi::append_address(&mut data, params.recipient);
    abi::append_u64(&mut data, params.deadline);
    abi::append_u256(&mut data, params.amount_in);
    abi::append_u256(&mut data, params.min_out);
    abi::append_u256(&mut data, U256::ZERO); // sqrtPriceLimitX96: no limit
    data.into()
}

/// V2-style `swapExactTokensForTokens` with a direct two-token path.
fn encode_v2_swap_exact_tokens(params: &SwapParams) -> Bytes {
    let mut data =
        abi::selector("swapExactTokensForTokens(uint256,uint256,address[],address,uint256)");
    abi::append_u256(&mut data, params.amount_in);
    abi::append_u256(&mut data, params.min_out);
    abi::append_u256(&mut data, U256::from(160u32)); // offset of path array
    abi::append_address(&mut data, params.recipient);
    abi::append_u64(&mut data, params.deadline);
    abi::append_u256(&mut data, U256::from(2u8)); // path length
    abi::append_address(&mut data, params.token_in);
    abi::append_address(&mut data, params.token_out);
    data.into()
}

/// Curve `exchange(i, j, dx, min_dy)` on the pool itself.
fn encode_curve_exchange(params: &SwapParams, i: u8, j: u8) -> Bytes {
    let mut data = abi::selector("exchange(uint256,uint256,uint256,uint256)");
    abi::append_u256(&mut data, U256::from(i));
    abi::append_u256(&mut data, U256::from(j));
    abi::append_u256(&mut data, params.amount_in);
    abi::append_u256(&mut data, params.min_out);
    data.into()
}

/// Builds the `(to, data, value)` triple for a swap draft from its retained
/// parameters. Used both for the initial draft and for optimizer
/// re-encodes after a revision changed amounts or slippage.
pub fn build_swap_call(
    registry: &Registry,
    params: &SwapParams,
) -> AgentResult<(Address, Bytes, U256)> {
    let venue = registry
        .venue(&params.venue)
        .ok_or_else(|| AgentError::InvalidIntent {
            reason: format!("unknown venue {} for swap", params.venue),
        })?;

    let value = if params.eth_in {
        params.amount_in
    } else {
        U256::ZERO
    };

    match venue.kind {
        VenueKind::UniswapV3 => {
            let router = venue.router.ok_or_else(|| AgentError::InvalidIntent {
                reason: format!("venue {} has no router", params.venue),
            })?;
            let fee = params.fee_tier.unwrap_or(3000);
            Ok((router, encode_v3_exact_input_single(params, fee), value))
        }
        VenueKind::SushiSwap => {
            let router = venue.router.ok_or_else(|| AgentError::InvalidIntent {
                reason: format!("venue {} has no router", params.venue),
            })?;
            Ok((router, encode_v2_swap_exact_tokens(params), value))
        }
        VenueKind::Curve => {
            let route = params.curve_route.ok_or_else(|| AgentError::InvalidIntent {
                reason: "curve swap without pool route".to_string(),
            })?;
            Ok((route.pool, encode_curve_exchange(params, route.i, route.j), value))
        }
        VenueKind::OneInch => Err(AgentError::InvalidIntent {
            reason: "venue oneinch is quote-only and cannot be drafted against".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn addr(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::from(bytes)
    }

    fn params(venue: &str) -> SwapParams {
        SwapParams {
            venue: venue.to_string(),
            token_in: addr(1),
            token_out: addr(2),
            token_in_symbol: "USDC".to_string(),
            token_out_symbol: "WETH".to_string(),
            token_in_decimals: 6,
            token_out_decimals: 18,
            fee_tier: Some(3000),
            amount_in: U256::from(1_000_000u64),
            expected_out: U256::from(300u64),
            min_out: U256::from(298u64),
            slippage_pct: dec!(0.5),
            recipient: addr(9),
            deadline: 1_700_000_000,
            eth_in: false,
            curve_route: None,
        }
    }

    #[test]
    fn transfer_and_approve_selectors() {
        let transfer = encode_erc20_transfer(addr(9), U256::from(5u8));
        assert_eq!(&transfer[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(transfer.len(), 4 + 64);

        let approve = encode_erc20_approve(addr(9), U256::from(5u8));
        assert_eq!(&approve[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
    }

    #[test]
    fn v3_swap_encodes_eight_words() {
        let registry = Registry::mainnet();
        let mut p = params("uniswap_v3");
        p.token_in = Address::from_str("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").unwrap();
        let (to, data, value) = build_swap_call(&registry, &p).unwrap();

        assert_eq!(to, crate::config::UNISWAP_V3_ROUTER);
        assert_eq!(&data[..4], &[0x41, 0x4b, 0xf3, 0x89]);
        assert_eq!(data.len(), 4 + 8 * 32);
        assert_eq!(value, U256::ZERO);
    }

    #[test]
    fn v2_swap_carries_a_two_token_path() {
        let registry = Registry::mainnet();
        let (to, data, _) = build_swap_call(&registry, &params("sushiswap")).unwrap();

        assert_eq!(to, crate::config::SUSHISWAP_ROUTER);
        // 5 head words + length + 2 path entries
        assert_eq!(data.len(), 4 + 8 * 32);
        // path length word
        assert_eq!(data[4 + 5 * 32 + 31], 2);
    }

    #[test]
    fn eth_in_swaps_send_call_value() {
        let registry = Registry::mainnet();
        let mut p = params("uniswap_v3");
        p.eth_in = true;
        let (_, _, value) = build_swap_call(&registry, &p).unwrap();
        assert_eq!(value, p.amount_in);
    }

    #[test]
    fn oneinch_is_not_draftable() {
        let registry = Registry::mainnet();
        let err = build_swap_call(&registry, &params("oneinch")).unwrap_err();
        assert!(matches!(err, AgentError::InvalidIntent { .. }));
    }
}
