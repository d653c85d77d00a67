use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::activity::{activity_counts, first_activity_date, is_meteora_transaction, pool_addresses};
use super::blacklist::Blacklist;
use super::certificate::CertificateMatcher;
use super::metrics::WalletMetrics;
use super::progress::{ProgressSink, Stage, StageTracker};
use crate::chain::constants::METEORA_DLMM_PROGRAM_ID;
use crate::chain::types::{SignatureEntry, SourceProvider, Sources, TransactionSummary, UserId};
use crate::config::Config;
use crate::error::{MetricsError, MetricsResult};
use crate::utils::RetryPolicy;

const TX_REPORT_EVERY: usize = 5;
const POOL_REPORT_EVERY: usize = 2;

/// A wallet transaction that touched the Meteora program
struct MeteoraTx {
    block_time: i64,
    tx: TransactionSummary,
}

/// Tunables shared by every wallet of a run
#[derive(Debug, Clone)]
pub struct ProcessorSettings {
    pub program_id: Pubkey,
    pub certificate: CertificateMatcher,
    pub retry: RetryPolicy,
    /// Minimum claimed fee (USD) for a pool to count as earning
    pub fee_threshold: Decimal,
    pub tx_fetch_concurrency: usize,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            program_id: METEORA_DLMM_PROGRAM_ID,
            certificate: CertificateMatcher::default(),
            retry: RetryPolicy::default(),
            fee_threshold: Decimal::new(1, 2),
            tx_fetch_concurrency: 1,
        }
    }
}

impl ProcessorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            program_id: config.meteora.program_id,
            retry: RetryPolicy::from(&config.retry),
            tx_fetch_concurrency: config.processing.tx_fetch_concurrency.max(1),
            ..Default::default()
        }
    }
}

/// Collects the metrics of one wallet.
///
/// Stages run in a fixed order. A failing stage is logged and marked
/// failed, its fields keep their defaults and the next stage still runs.
pub struct WalletProcessor {
    wallet: String,
    user: UserId,
    provider: Arc<dyn SourceProvider>,
    sources: Sources,
    blacklist: Arc<Blacklist>,
    settings: ProcessorSettings,
    progress: Option<Arc<dyn ProgressSink>>,
    tracker: StageTracker,
    metrics: WalletMetrics,
    signatures: Vec<SignatureEntry>,
    meteora_txs: Vec<MeteoraTx>,
    pools: Vec<String>,
}

impl WalletProcessor {
    pub fn new(
        wallet: impl Into<String>,
        user: UserId,
        provider: Arc<dyn SourceProvider>,
        blacklist: Arc<Blacklist>,
        settings: ProcessorSettings,
    ) -> Self {
        let wallet = wallet.into();
        let sources = provider.lease(user);
        Self {
            metrics: WalletMetrics::empty(wallet.clone()),
            wallet,
            user,
            provider,
            sources,
            blacklist,
            settings,
            progress: None,
            tracker: StageTracker::default(),
            signatures: Vec::new(),
            meteora_txs: Vec::new(),
            pools: Vec::new(),
        }
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub async fn process(mut self) -> WalletMetrics {
        info!("Processing wallet: {}", self.wallet);

        self.check_blacklist().await;
        self.check_cnft().await;
        self.get_transactions().await;
        self.filter_meteora_transactions().await;
        self.process_timestamps().await;
        self.calculate_activity_metrics().await;
        self.extract_pool_addresses().await;
        self.get_pool_fees().await;

        info!(
            "Finished wallet {}: fees ${}, {} pool(s), {} Meteora tx(s)",
            self.wallet,
            self.metrics.rounded_fees(),
            self.metrics.pools_with_fees,
            self.meteora_txs.len()
        );
        self.metrics
    }

    async fn report(&self) {
        if let Some(sink) = &self.progress {
            sink.report(&self.tracker.details()).await;
        }
    }

    fn finish(&mut self, stage: Stage, outcome: MetricsResult<()>) {
        match outcome {
            Ok(()) => self.tracker.get_mut(stage).complete(),
            Err(e) => {
                error!("{} failed for {}: {}", stage.name(), self.wallet, e);
                self.tracker.get_mut(stage).fail();
            }
        }
    }

    async fn check_blacklist(&mut self) {
        self.tracker.get_mut(Stage::CheckBlacklist).start(None);
        self.metrics.blacklisted = self.blacklist.contains(&self.wallet);
        self.finish(Stage::CheckBlacklist, Ok(()));
        self.report().await;
    }

    async fn check_cnft(&mut self) {
        self.tracker.get_mut(Stage::CheckCnft).start(None);
        let outcome = self.find_certificate().await;
        self.finish(Stage::CheckCnft, outcome);
        self.report().await;
    }

    async fn find_certificate(&mut self) -> MetricsResult<()> {
        let attempts = AtomicU32::new(0);
        let provider = self.provider.clone();
        let first = self.sources.assets.clone();
        let (user, wallet) = (self.user, self.wallet.as_str());

        let assets = self
            .settings
            .retry
            .retry_async("check_cnft", || {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                // Each retry goes out with a fresh Helius key
                let index = if attempt == 0 {
                    first.clone()
                } else {
                    debug!("Retry {} of certificate lookup for {}", attempt, wallet);
                    provider.lease(user).assets
                };
                async move { index.assets_by_owner(wallet).await }
            })
            .await?;

        debug!("Checking {} asset(s) of {} for the certificate", assets.len(), wallet);
        match self.settings.certificate.find(&assets) {
            Some(found) => {
                info!(
                    "Found LP Army certificate {} for {} ({:?})",
                    found.asset_id, wallet, found.kind
                );
                self.metrics.cnft = true;
            }
            None => debug!("No LP Army certificate among {} asset(s) of {}", assets.len(), wallet),
        }
        Ok(())
    }

    async fn get_transactions(&mut self) {
        self.tracker.get_mut(Stage::GetTransactions).start(None);

        let outcome = match Pubkey::from_str(&self.wallet) {
            Ok(pubkey) => {
                let history = self.sources.history.clone();
                self.settings
                    .retry
                    .retry_async("get_transactions", || history.signatures(&pubkey))
                    .await
                    .map(|signatures| {
                        self.tracker
                            .get_mut(Stage::GetTransactions)
                            .update(signatures.len());
                        self.signatures = signatures;
                    })
            }
            Err(_) => Err(MetricsError::InvalidAddress(self.wallet.clone())),
        };

        self.finish(Stage::GetTransactions, outcome);
        self.report().await;
    }

    async fn filter_meteora_transactions(&mut self) {
        let total = self.signatures.len();
        self.tracker
            .get_mut(Stage::FilterMeteoraTransactions)
            .start(Some(total));

        let history = self.sources.history.clone();
        let retry = self.settings.retry.clone();
        let fetches = stream::iter(std::mem::take(&mut self.signatures))
            .map(|entry| {
                let history = history.clone();
                let retry = retry.clone();
                async move {
                    let tx = retry
                        .retry_async("get_transaction", || history.transaction(&entry.signature))
                        .await;
                    (entry, tx)
                }
            })
            .buffered(self.settings.tx_fetch_concurrency.max(1));
        let mut fetches = std::pin::pin!(fetches);

        let mut index = 0;
        while let Some((entry, fetched)) = fetches.next().await {
            index += 1;
            match fetched {
                Ok(Some(tx)) => {
                    if is_meteora_transaction(&tx, &self.settings.program_id) {
                        self.meteora_txs.push(MeteoraTx {
                            block_time: entry.block_time,
                            tx,
                        });
                    }
                }
                Ok(None) => debug!("Transaction {} not found", entry.signature),
                Err(e) => error!("Error processing transaction {}: {}", entry.signature, e),
            }

            self.tracker
                .get_mut(Stage::FilterMeteoraTransactions)
                .update(index);
            if index % TX_REPORT_EVERY == 0 || index == total {
                self.report().await;
            }
        }

        info!(
            "{} of {} transaction(s) of {} touch Meteora",
            self.meteora_txs.len(),
            total,
            self.wallet
        );
        self.finish(Stage::FilterMeteoraTransactions, Ok(()));
        self.report().await;
    }

    fn record_pool(&mut self, pool: String) {
        if !self.pools.contains(&pool) {
            self.pools.push(pool);
        }
    }

    fn meteora_timestamps(&self) -> Vec<i64> {
        self.meteora_txs.iter().map(|m| m.block_time).collect()
    }

    async fn process_timestamps(&mut self) {
        self.tracker.get_mut(Stage::ProcessTimestamps).start(None);
        self.metrics.first_tx = first_activity_date(&self.meteora_timestamps());
        self.finish(Stage::ProcessTimestamps, Ok(()));
        self.report().await;
    }

    async fn calculate_activity_metrics(&mut self) {
        self.tracker
            .get_mut(Stage::CalculateActivityMetrics)
            .start(None);
        let counts = activity_counts(&self.meteora_timestamps());
        self.metrics.active_weeks = counts.weeks;
        self.metrics.active_months = counts.months;
        self.finish(Stage::CalculateActivityMetrics, Ok(()));
        self.report().await;
    }

    /// Unique pools of the Meteora transactions, in first-seen order
    async fn extract_pool_addresses(&mut self) {
        let total = self.meteora_txs.len();
        self.tracker
            .get_mut(Stage::ExtractPoolAddress)
            .start(Some(total));

        for index in 1..=total {
            let meteora = &self.meteora_txs[index - 1];
            for pool in pool_addresses(&meteora.tx, &self.settings.program_id) {
                self.record_pool(pool);
            }

            self.tracker.get_mut(Stage::ExtractPoolAddress).update(index);
            if index % TX_REPORT_EVERY == 0 || index == total {
                self.report().await;
            }
        }

        debug!("{} unique pool(s) for {}", self.pools.len(), self.wallet);
        self.finish(Stage::ExtractPoolAddress, Ok(()));
        self.report().await;
    }

    async fn get_pool_fees(&mut self) {
        let total = self.pools.len();
        self.tracker.get_mut(Stage::GetPoolFees).start(Some(total));

        let fees = self.sources.fees.clone();
        let pools = self.pools.clone();
        for (i, pool) in pools.iter().enumerate() {
            let index = i + 1;
            let wallet = self.wallet.as_str();
            let claimed = self
                .settings
                .retry
                .retry_async("get_pool_fees", || fees.claimed_fees(wallet, pool))
                .await;

            match claimed {
                Ok(fee) => {
                    self.metrics.total_fees += fee;
                    if fee >= self.settings.fee_threshold {
                        self.metrics.pools_with_fees += 1;
                    }
                }
                Err(e) => error!("Failed to get fees for {}: {}", pool, e),
            }

            self.tracker.get_mut(Stage::GetPoolFees).update(index);
            if index % POOL_REPORT_EVERY == 0 || index == total {
                self.report().await;
            }
        }

        self.finish(Stage::GetPoolFees, Ok(()));
        self.report().await;
    }
}

/// Process `wallets` with at most `concurrency` wallets in flight.
///
/// Results come back in input order, one per wallet.
pub async fn process_wallets(
    wallets: &[String],
    user: UserId,
    provider: Arc<dyn SourceProvider>,
    blacklist: Arc<Blacklist>,
    settings: &ProcessorSettings,
    concurrency: usize,
) -> Vec<WalletMetrics> {
    stream::iter(wallets.iter().cloned())
        .map(|wallet| {
            WalletProcessor::new(
                wallet,
                user,
                provider.clone(),
                blacklist.clone(),
                settings.clone(),
            )
            .process()
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}
