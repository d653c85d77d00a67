use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::endpoints::EndpointRotator;
use super::helius::HeliusClient;
use super::meteora_api::MeteoraApiClient;
use super::rpc::{new_transaction_cache, SolanaHistoryClient, TransactionCache};
use super::types::{SourceProvider, Sources, UserId};
use crate::config::Config;
use crate::error::{MetricsError, MetricsResult};

/// Builds live RPC / Helius / Meteora clients for each endpoint lease.
///
/// The HTTP clients and the transaction cache are shared by every lease.
pub struct EndpointClients {
    config: Arc<Config>,
    rotator: EndpointRotator,
    helius_http: reqwest::Client,
    meteora: Arc<MeteoraApiClient>,
    tx_cache: TransactionCache,
}

impl EndpointClients {
    pub fn new(config: Arc<Config>) -> MetricsResult<Self> {
        let rotator = EndpointRotator::new(
            config.rpc.urls.clone(),
            config.helius.api_keys.clone(),
        )?;

        let helius_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.helius.timeout_seconds))
            .build()
            .map_err(|e| MetricsError::Config(format!("Helius HTTP client: {}", e)))?;

        let meteora_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.meteora.timeout_seconds))
            .build()
            .map_err(|e| MetricsError::Config(format!("Meteora HTTP client: {}", e)))?;
        let meteora = Arc::new(MeteoraApiClient::new(
            meteora_http,
            config.meteora.api_url.clone(),
        ));

        let tx_cache = new_transaction_cache(
            Duration::from_secs(config.cache.ttl_seconds),
            config.cache.max_size,
        );

        info!(
            "Endpoint pool ready: {} RPC URL(s), {} Helius key(s)",
            config.rpc.urls.len(),
            config.helius.api_keys.len()
        );

        Ok(Self {
            config,
            rotator,
            helius_http,
            meteora,
            tx_cache,
        })
    }
}

impl SourceProvider for EndpointClients {
    fn lease(&self, user: UserId) -> Sources {
        let lease = self.rotator.next_for_user(user);
        info!(
            "Using RPC URL index {} and Helius API key index {} for user {}",
            lease.rpc_index, lease.helius_index, user
        );

        let history = SolanaHistoryClient::new(
            lease.rpc_url,
            self.config.rpc.commitment,
            Duration::from_secs(self.config.rpc.timeout_seconds),
            self.config.rpc.signature_limit,
            self.tx_cache.clone(),
        );
        let assets = HeliusClient::new(
            self.helius_http.clone(),
            self.config.helius.base_url.clone(),
            lease.helius_key,
            self.config.helius.page_limit,
            self.config.helius.max_pages,
        );

        Sources {
            history: Arc::new(history),
            assets: Arc::new(assets),
            fees: self.meteora.clone(),
        }
    }

    fn release(&self, user: UserId) {
        self.rotator.release_user(user);
    }
}
