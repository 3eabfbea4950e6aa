//! DEX Arbitrage Agent - price aggregation, opportunity detection and
//! transaction validation for Ethereum mainnet
//!
//! The agent fans out to multiple liquidity venues for quotes, detects
//! cross-venue arbitrage opportunities, drafts the corresponding swap
//! transactions and runs each draft through a bounded evaluate/optimize
//! loop before it is handed back to the caller for submission.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod chain;
pub mod venues;
pub mod aggregator;
pub mod detector;
pub mod drafting;
pub mod evaluator;
pub mod utils;

// Re-export commonly used items
pub use config::Config;
pub use errors::{AgentError, AgentResult};
pub use types::*;

// Type alias for our concrete provider
pub type ConcreteProvider = alloy::providers::RootProvider<alloy::transports::BoxTransport>;
