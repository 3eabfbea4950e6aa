//! Transaction draft and intent types

use alloy::primitives::{Address, Bytes, U256};
use rust_decimal::Decimal;
use serde::Serialize;

/// A structured, caller-resolved trading intent. Token symbols, amounts and
/// recipients are already parsed out of the user's request; the drafter only
/// resolves addresses and encodes calldata.
#[derive(Debug, Clone)]
pub enum TradeIntent {
    Swap {
        token_in: String,
        token_out: String,
        /// Amount of `token_in`, in human units.
        amount_in: Decimal,
        /// Expected output in human units of `token_out`, from a prior quote.
        expected_out: Decimal,
        /// Recipient address or the wallet placeholder.
        recipient: String,
        venue: Option<String>,
        slippage_pct: Option<Decimal>,
    },
    Transfer {
        /// `None` transfers native ETH.
        token: Option<String>,
        amount: Decimal,
        recipient: String,
    },
    Approve {
        token: String,
        spender: String,
        amount: Decimal,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DraftKind {
    EthTransfer,
    Erc20Transfer,
    Approve,
    SimpleSwap,
    ComplexSwap,
}

/// Coin coordinates for a swap through a Curve pool, oriented from
/// `token_in` (`i`) to `token_out` (`j`).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CurveRoute {
    pub pool: Address,
    pub i: u8,
    pub j: u8,
}

/// Swap parameters retained on the draft so the optimizer can re-encode
/// calldata when a revision changes size or slippage.
#[derive(Debug, Clone, Serialize)]
pub struct SwapParams {
    pub venue: String,
    pub token_in: Address,
    pub token_out: Address,
    pub token_in_symbol: String,
    pub token_out_symbol: String,
    pub token_in_decimals: u32,
    pub token_out_decimals: u32,
    /// Fee tier in hundredths of a bip, for venues that price by tier.
    pub fee_tier: Option<u32>,
    pub amount_in: U256,
    pub expected_out: U256,
    pub min_out: U256,
    pub slippage_pct: Decimal,
    pub recipient: Address,
    /// Unix deadline for the swap call.
    pub deadline: u64,
    /// True when the input side is native ETH sent as call value.
    pub eth_in: bool,
    pub curve_route: Option<CurveRoute>,
}

/// An unsigned, not-yet-validated transaction descriptor.
///
/// Mutable across optimization rounds: each revision derives a new draft
/// from the prior one plus the evaluator's feedback. A draft never carries
/// an unresolved wallet placeholder; every address field is a concrete
/// `Address` by construction.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionDraft {
    pub id: String,
    pub revision: u32,
    pub kind: DraftKind,
    pub from: Option<Address>,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub estimated_gas: u64,
    /// False when gas estimation failed and the conservative default was used.
    pub gas_estimated: bool,
    pub private_relay: bool,
    pub max_priority_fee_gwei: Option<u32>,
    pub swap_params: Option<SwapParams>,
}

impl TransactionDraft {
    pub fn is_swap(&self) -> bool {
        matches!(self.kind, DraftKind::SimpleSwap | DraftKind::ComplexSwap)
    }
}
