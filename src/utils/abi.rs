//! Minimal ABI call-data packing helpers
//!
//! Quoting and drafting build calldata by hand from a function signature
//! and 32-byte words; no generated bindings are involved.

use alloy::primitives::{Address, U256, keccak256};

/// First four bytes of the keccak-256 of a canonical function signature.
pub fn selector(signature: &str) -> Vec<u8> {
    keccak256(signature)[..4].to_vec()
}

pub fn append_address(buf: &mut Vec<u8>, address: Address) {
    buf.extend_from_slice(&[0u8; 12]);
    buf.extend_from_slice(address.as_slice());
}

pub fn append_u256(buf: &mut Vec<u8>, value: U256) {
    buf.extend_from_slice(&value.to_be_bytes::<32>());
}

pub fn append_u64(buf: &mut Vec<u8>, value: u64) {
    append_u256(buf, U256::from(value));
}
