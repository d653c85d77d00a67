use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;

use crate::error::MetricsResult;

/// Identifies whoever a request is made for. The CLI uses [`CLI_USER`],
/// the bot uses the Telegram user id.
pub type UserId = u64;

pub const CLI_USER: UserId = 0;

/// A confirmed signature of a wallet together with its block time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEntry {
    pub signature: String,
    pub block_time: i64,
}

/// Top-level instruction of a `jsonParsed` transaction that the node could
/// not decode further (program instructions such as Meteora's).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInstruction {
    pub program_id: String,
    pub accounts: Vec<String>,
}

/// The part of a fetched transaction the metrics pipeline looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSummary {
    pub signature: String,
    pub block_time: Option<i64>,
    pub instructions: Vec<ProgramInstruction>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DasCreator {
    pub address: String,
    #[serde(default)]
    pub verified: bool,
}

/// Asset returned by the Helius DAS `getAssetsByOwner` method.
///
/// `content` is kept as raw JSON: certificate detection looks at several
/// optional locations inside it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DasAsset {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub creators: Vec<DasCreator>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<DasCreator>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<DasCreator>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Signature history and transaction lookups (Solana JSON-RPC)
#[async_trait]
pub trait ChainHistory: Send + Sync {
    async fn signatures(&self, wallet: &Pubkey) -> MetricsResult<Vec<SignatureEntry>>;

    /// `Ok(None)` when the node does not know the transaction
    async fn transaction(&self, signature: &str) -> MetricsResult<Option<TransactionSummary>>;
}

/// Digital asset index (Helius DAS)
#[async_trait]
pub trait AssetIndex: Send + Sync {
    async fn assets_by_owner(&self, owner: &str) -> MetricsResult<Vec<DasAsset>>;
}

/// Claimed fee lookups (Meteora DLMM API)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeeSource: Send + Sync {
    /// Total fees claimed by `wallet` from `pool`, in USD
    async fn claimed_fees(&self, wallet: &str, pool: &str) -> MetricsResult<Decimal>;
}

/// One set of data sources bound to a single endpoint lease
#[derive(Clone)]
pub struct Sources {
    pub history: Arc<dyn ChainHistory>,
    pub assets: Arc<dyn AssetIndex>,
    pub fees: Arc<dyn FeeSource>,
}

/// Hands out [`Sources`] per user, rotating the underlying endpoints
pub trait SourceProvider: Send + Sync {
    fn lease(&self, user: UserId) -> Sources;

    /// Forget the user's endpoint assignment once their request is done
    fn release(&self, user: UserId);
}
