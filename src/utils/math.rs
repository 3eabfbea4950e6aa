//! Decimal/base-unit conversion helpers

use alloy::primitives::U256;
use anyhow::{Context, Result};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

pub fn pow10(n: u32) -> Decimal {
    match n {
        0 => dec!(1),
        6 => dec!(1_000_000),
        18 => dec!(1_000_000_000_000_000_000),
        _ => {
            let mut result = dec!(1);
            for _ in 0..n {
                result *= dec!(10);
            }
            result
        }
    }
}

/// Human-unit amount to on-chain base units, truncating sub-unit dust.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<U256> {
    let scaled = (amount * pow10(decimals)).trunc();
    if scaled.is_sign_negative() {
        anyhow::bail!("negative amount: {amount}");
    }
    let raw = scaled
        .to_u128()
        .with_context(|| format!("amount {amount} does not fit in u128 base units"))?;
    Ok(U256::from(raw))
}

/// On-chain base units to a human-unit `Decimal`.
pub fn from_base_units(units: U256, decimals: u32) -> Result<Decimal> {
    let value = Decimal::from_str(&units.to_string())
        .with_context(|| format!("base-unit value {units} exceeds Decimal range"))?;
    Ok(value / pow10(decimals))
}
