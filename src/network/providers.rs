//! Network provider setup

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use crate::{
    config::Config,
    network::retry::{retry_with_backoff, RetryConfig},
    ConcreteProvider,
};

/// Builds the mainnet provider from `RPC_URL` or an Alchemy API key and
/// verifies connectivity before handing it out.
pub async fn setup_mainnet_provider(config: &Config) -> Result<Arc<ConcreteProvider>> {
    let rpc_url = match (&config.rpc_url, &config.alchemy_api_key) {
        (Some(url), _) => url.clone(),
        (None, Some(key)) => format!("https://eth-mainnet.g.alchemy.com/v2/{}", key),
        (None, None) => anyhow::bail!("RPC_URL or ALCHEMY_API_KEY is required"),
    };

    let provider: Arc<ConcreteProvider> = Arc::new(
        ProviderBuilder::new()
            .on_http(rpc_url.parse()?)
            .boxed()
    );

    info!("🔗 Testing connection to Ethereum mainnet...");
    let block = retry_with_backoff(
        || async {
            provider.get_block_number().await
                .context("Failed to get block number")
        },
        &RetryConfig {
            max_attempts: 5,
            initial_delay_ms: 500,
            max_delay_ms: 10000,
            exponential_base: 2.0,
        },
        "mainnet connection",
    ).await
    .map_err(|e| {
        warn!("⚠️ Network connection attempt failed: {}", e);
        anyhow::anyhow!("Network connection failed: {}", e)
    })?;

    info!("✅ Connected to Ethereum mainnet at block {}", block);
    Ok(provider)
}
