//! External chain collaborators: RPC client and wallet resolution

pub mod client;
pub mod wallet;

pub use client::*;
pub use wallet::*;
