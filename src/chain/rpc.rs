use async_trait::async_trait;
use moka::future::Cache;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_response::RpcConfirmedTransactionStatusWithSignature;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature};
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiInstruction, UiMessage,
    UiParsedInstruction, UiTransactionEncoding,
};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::constants::SIGNATURE_PAGE_SIZE;
use super::types::{ChainHistory, ProgramInstruction, SignatureEntry, TransactionSummary};
use crate::error::{MetricsError, MetricsResult};

/// Parsed transactions shared between every lease, keyed by signature
pub type TransactionCache = Cache<String, Arc<Option<TransactionSummary>>>;

pub fn new_transaction_cache(ttl: Duration, max_size: u64) -> TransactionCache {
    Cache::builder()
        .max_capacity(max_size)
        .time_to_live(ttl)
        .build()
}

/// Wallet history reader over a single Solana RPC endpoint
pub struct SolanaHistoryClient {
    rpc_client: RpcClient,
    commitment: CommitmentConfig,
    signature_limit: usize,
    cache: TransactionCache,
}

impl SolanaHistoryClient {
    pub fn new(
        rpc_url: String,
        commitment: CommitmentConfig,
        timeout: Duration,
        signature_limit: usize,
        cache: TransactionCache,
    ) -> Self {
        Self {
            rpc_client: RpcClient::new_with_timeout_and_commitment(rpc_url, timeout, commitment),
            commitment,
            signature_limit,
            cache,
        }
    }

    async fn fetch_transaction(
        &self,
        signature: &Signature,
    ) -> MetricsResult<Option<TransactionSummary>> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        };

        match self
            .rpc_client
            .get_transaction_with_config(signature, config)
            .await
        {
            Ok(confirmed) => Ok(Some(summarize_transaction(&signature.to_string(), &confirmed))),
            // The node answers `null` for unknown or pruned transactions,
            // which the client reports as a deserialization failure.
            Err(e) if is_missing_transaction(&e) => {
                debug!("Transaction {} not available: {}", signature, e);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ChainHistory for SolanaHistoryClient {
    async fn signatures(&self, wallet: &Pubkey) -> MetricsResult<Vec<SignatureEntry>> {
        let commitment = self.commitment;
        let rpc_client = &self.rpc_client;
        let (entries, fetched) =
            collect_signature_pages(self.signature_limit, move |before, limit| {
                let config = GetConfirmedSignaturesForAddress2Config {
                    before,
                    until: None,
                    limit: Some(limit),
                    commitment: Some(commitment),
                };
                async move {
                    rpc_client
                        .get_signatures_for_address_with_config(wallet, config)
                        .await
                        .map_err(MetricsError::from)
                }
            })
            .await?;

        info!(
            "Fetched {} signatures with block time for {} ({} total)",
            entries.len(),
            wallet,
            fetched
        );
        Ok(entries)
    }

    async fn transaction(&self, signature: &str) -> MetricsResult<Option<TransactionSummary>> {
        if let Some(cached) = self.cache.get(signature).await {
            debug!("Transaction cache hit: {}", signature);
            return Ok(cached.as_ref().clone());
        }

        let parsed = Signature::from_str(signature)
            .map_err(|_| MetricsError::InvalidResponse(format!("bad signature {}", signature)))?;
        let summary = self.fetch_transaction(&parsed).await?;

        self.cache
            .insert(signature.to_string(), Arc::new(summary.clone()))
            .await;
        Ok(summary)
    }
}

/// Walk a wallet's signature history newest first, `before` the last
/// signature of the previous page, until `signature_limit` signatures were
/// read or a page comes back short.
///
/// Returns the entries that carry a block time and the number of
/// signatures read, including those without one.
pub async fn collect_signature_pages<F, Fut>(
    signature_limit: usize,
    mut fetch_page: F,
) -> MetricsResult<(Vec<SignatureEntry>, usize)>
where
    F: FnMut(Option<Signature>, usize) -> Fut,
    Fut: Future<Output = MetricsResult<Vec<RpcConfirmedTransactionStatusWithSignature>>>,
{
    let mut entries = Vec::new();
    let mut before: Option<Signature> = None;
    let mut fetched = 0usize;

    while fetched < signature_limit {
        let limit = (signature_limit - fetched).min(SIGNATURE_PAGE_SIZE);
        let page = fetch_page(before, limit).await?;
        let page_len = page.len();
        fetched += page_len;

        before = match page.last() {
            Some(last) => Some(
                Signature::from_str(&last.signature)
                    .map_err(|e| MetricsError::InvalidResponse(e.to_string()))?,
            ),
            None => None,
        };

        entries.extend(page.into_iter().filter_map(|status| {
            status.block_time.map(|block_time| SignatureEntry {
                signature: status.signature,
                block_time,
            })
        }));

        if page_len < limit {
            break;
        }
    }

    Ok((entries, fetched))
}

fn is_missing_transaction(error: &solana_client::client_error::ClientError) -> bool {
    matches!(
        error.kind(),
        solana_client::client_error::ClientErrorKind::SerdeJson(_)
    )
}

/// Keep the top-level partially decoded instructions of a `jsonParsed`
/// transaction. Other encodings carry no program instructions we can read.
pub fn summarize_transaction(
    signature: &str,
    confirmed: &EncodedConfirmedTransactionWithStatusMeta,
) -> TransactionSummary {
    let instructions = match &confirmed.transaction.transaction {
        EncodedTransaction::Json(ui_tx) => match &ui_tx.message {
            UiMessage::Parsed(message) => message
                .instructions
                .iter()
                .filter_map(|instruction| match instruction {
                    UiInstruction::Parsed(UiParsedInstruction::PartiallyDecoded(decoded)) => {
                        Some(ProgramInstruction {
                            program_id: decoded.program_id.clone(),
                            accounts: decoded.accounts.clone(),
                        })
                    }
                    _ => None,
                })
                .collect(),
            UiMessage::Raw(_) => Vec::new(),
        },
        _ => Vec::new(),
    };

    TransactionSummary {
        signature: signature.to_string(),
        block_time: confirmed.block_time,
        instructions,
    }
}
