//! Token pair identification

use std::fmt;
use std::str::FromStr;
use serde::Serialize;
use crate::errors::AgentError;

/// A base/quote token pair, e.g. `WETH/USDC`. Prices for a pair are always
/// expressed as quote token per one base token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TokenPair {
    pub base: String,
    pub quote: String,
}

impl TokenPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
        }
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for TokenPair {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((base, quote)) if !base.trim().is_empty() && !quote.trim().is_empty() => {
                Ok(TokenPair::new(base.trim(), quote.trim()))
            }
            _ => Err(AgentError::InvalidIntent {
                reason: format!("malformed token pair: {s:?}, expected BASE/QUOTE"),
            }),
        }
    }
}
