//! Wallet address resolution

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::str::FromStr;
use crate::{
    config::Config,
    errors::{AgentError, AgentResult},
};

/// Placeholder token callers may use to mean "the agent's own wallet".
/// Recognition is case-insensitive.
pub const WALLET_PLACEHOLDER: &str = "0xYourWalletAddress";

/// Resolves address strings, substituting the agent's configured wallet
/// for the placeholder. Every draft leaves the drafting component with
/// fully resolved `Address` values; the placeholder never survives past
/// this boundary.
#[derive(Debug, Clone)]
pub struct WalletResolver {
    agent_address: Address,
}

impl WalletResolver {
    pub fn new(agent_address: Address) -> Self {
        Self { agent_address }
    }

    /// Builds the resolver from `AGENT_ADDRESS`, falling back to deriving
    /// the address from the configured signing key.
    pub fn from_config(config: &Config) -> AgentResult<Self> {
        if let Some(raw) = &config.agent_address {
            let address = Address::from_str(raw).map_err(|e| AgentError::InvalidIntent {
                reason: format!("AGENT_ADDRESS is not a valid address: {e}"),
            })?;
            return Ok(Self::new(address));
        }

        if let Some(key) = &config.private_key {
            let signer = PrivateKeySigner::from_str(key).map_err(|e| {
                AgentError::InvalidIntent {
                    reason: format!("AGENT_ETH_KEY is not a valid private key: {e}"),
                }
            })?;
            return Ok(Self::new(signer.address()));
        }

        Err(AgentError::InvalidIntent {
            reason: "no agent wallet configured: set AGENT_ADDRESS or AGENT_ETH_KEY".to_string(),
        })
    }

    pub fn agent_address(&self) -> Address {
        self.agent_address
    }

    /// Resolves a placeholder or literal address string to a checksummed
    /// address.
    pub fn resolve(&self, raw: &str) -> AgentResult<Address> {
        if raw.eq_ignore_ascii_case(WALLET_PLACEHOLDER) {
            return Ok(self.agent_address);
        }

        Address::from_str(raw).map_err(|e| AgentError::InvalidIntent {
            reason: format!("unresolvable recipient {raw:?}: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> WalletResolver {
        WalletResolver::new(
            Address::from_str("0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B").unwrap(),
        )
    }

    #[test]
    fn resolves_placeholder_case_insensitively() {
        let resolver = resolver();
        for variant in [
            "0xYourWalletAddress",
            "0xyourwalletaddress",
            "0XYOURWALLETADDRESS",
        ] {
            assert_eq!(resolver.resolve(variant).unwrap(), resolver.agent_address());
        }
    }

    #[test]
    fn passes_through_literal_addresses() {
        let resolver = resolver();
        let literal = "0x2222222222222222222222222222222222222222";
        assert_eq!(
            resolver.resolve(literal).unwrap(),
            Address::from_str(literal).unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = resolver().resolve("not-an-address").unwrap_err();
        assert!(matches!(err, AgentError::InvalidIntent { .. }));
    }
}
