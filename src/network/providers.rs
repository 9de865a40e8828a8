//! Provider setup for the development node

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use crate::{
    errors::EnvResult,
    network::retry::{retry_with_backoff, RetryConfig},
    ConcreteProvider,
};

/// Connects to `rpc_url` and waits until the node answers.
pub async fn setup_node_provider(rpc_url: &str) -> Result<Arc<ConcreteProvider>> {
    let provider: Arc<ConcreteProvider> = Arc::new(
        ProviderBuilder::new()
            .on_http(rpc_url.parse().context("Invalid RPC URL")?)
            .boxed()
    );

    info!("🔗 Testing connection to {}...", rpc_url);
    let block = wait_for_node(&provider).await.map_err(|e| {
        warn!("⚠️ Node connection attempt failed: {}", e);
        anyhow::anyhow!("Node connection failed: {}", e)
    })?;

    info!("✅ Connected to node at block {}", block);
    Ok(provider)
}

async fn wait_for_node(provider: &Arc<ConcreteProvider>) -> EnvResult<u64> {
    retry_with_backoff(
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
        "node connection",
    ).await
}
