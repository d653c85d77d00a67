// Helper utilities for pipeline integration tests
//
// In-memory stand-ins for the RPC node, the Helius DAS index and the
// Meteora API, plus a provider that hands them out through a real
// endpoint rotator so lease bookkeeping is exercised too.

#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use meteora_lp_metrics::chain::constants::{CERTIFICATE_CREATOR, METEORA_DLMM_PROGRAM_ID};
use meteora_lp_metrics::chain::{
    AssetIndex, ChainHistory, DasAsset, EndpointLease, EndpointRotator, FeeSource,
    ProgramInstruction, SignatureEntry, SourceProvider, Sources, TransactionSummary, UserId,
};
use meteora_lp_metrics::{MetricsError, MetricsResult};

pub const WALLET_A: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
pub const WALLET_B: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

/// Unix time of `day` days after 2024-01-01, at noon UTC
pub fn noon_2024(day: i64) -> i64 {
    1_704_110_400 + day * 86_400
}

#[derive(Default)]
pub struct FakeHistory {
    pub signatures: HashMap<String, Vec<SignatureEntry>>,
    pub transactions: HashMap<String, TransactionSummary>,
    pub fetches: Mutex<usize>,
}

impl FakeHistory {
    pub fn add_meteora_tx(&mut self, wallet: &str, signature: &str, block_time: i64, pool: &str) {
        self.add_tx(
            wallet,
            signature,
            block_time,
            ProgramInstruction {
                program_id: METEORA_DLMM_PROGRAM_ID.to_string(),
                accounts: vec!["position".into(), "owner".into(), pool.to_string()],
            },
        );
    }

    pub fn add_other_tx(&mut self, wallet: &str, signature: &str, block_time: i64) {
        self.add_tx(
            wallet,
            signature,
            block_time,
            ProgramInstruction {
                program_id: "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA".to_string(),
                accounts: vec!["a".into(), "b".into(), "c".into()],
            },
        );
    }

    fn add_tx(&mut self, wallet: &str, signature: &str, block_time: i64, ix: ProgramInstruction) {
        self.signatures
            .entry(wallet.to_string())
            .or_default()
            .push(SignatureEntry {
                signature: signature.to_string(),
                block_time,
            });
        self.transactions.insert(
            signature.to_string(),
            TransactionSummary {
                signature: signature.to_string(),
                block_time: Some(block_time),
                instructions: vec![ix],
            },
        );
    }
}

#[async_trait]
impl ChainHistory for FakeHistory {
    async fn signatures(&self, wallet: &Pubkey) -> MetricsResult<Vec<SignatureEntry>> {
        Ok(self
            .signatures
            .get(&wallet.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn transaction(&self, signature: &str) -> MetricsResult<Option<TransactionSummary>> {
        *self.fetches.lock().unwrap() += 1;
        Ok(self.transactions.get(signature).cloned())
    }
}

#[derive(Default)]
pub struct FakeAssets {
    pub by_owner: HashMap<String, Vec<DasAsset>>,
}

impl FakeAssets {
    pub fn give_certificate(&mut self, owner: &str) {
        let asset: DasAsset = serde_json::from_value(json!({
            "id": format!("cert-{}", owner),
            "creators": [{ "address": CERTIFICATE_CREATOR, "verified": true }],
            "content": { "metadata": { "name": "Meteora LP Army Certificate" } }
        }))
        .expect("valid asset json");
        self.by_owner.entry(owner.to_string()).or_default().push(asset);
    }
}

#[async_trait]
impl AssetIndex for FakeAssets {
    async fn assets_by_owner(&self, owner: &str) -> MetricsResult<Vec<DasAsset>> {
        Ok(self.by_owner.get(owner).cloned().unwrap_or_default())
    }
}

/// Claimed fees keyed by `(wallet, pool)`; missing pairs fail like an API error
#[derive(Default)]
pub struct FakeFees {
    pub claimed: HashMap<(String, String), Decimal>,
}

impl FakeFees {
    pub fn set(&mut self, wallet: &str, pool: &str, fee: Decimal) {
        self.claimed.insert((wallet.to_string(), pool.to_string()), fee);
    }
}

#[async_trait]
impl FeeSource for FakeFees {
    async fn claimed_fees(&self, wallet: &str, pool: &str) -> MetricsResult<Decimal> {
        self.claimed
            .get(&(wallet.to_string(), pool.to_string()))
            .copied()
            .ok_or_else(|| MetricsError::Api(format!("no earnings for {}", pool)))
    }
}

/// Serves the fakes through an [`EndpointRotator`] and records every lease
pub struct RotatingProvider {
    pub rotator: EndpointRotator,
    pub history: Arc<FakeHistory>,
    pub sources: Sources,
    pub leases: Mutex<Vec<(UserId, EndpointLease)>>,
    pub released: Mutex<Vec<UserId>>,
}

impl RotatingProvider {
    pub fn new(history: FakeHistory, assets: FakeAssets, fees: FakeFees) -> Arc<Self> {
        let rotator = EndpointRotator::new(
            vec!["http://rpc-0".into(), "http://rpc-1".into()],
            vec!["key-0".into(), "key-1".into(), "key-2".into()],
        )
        .expect("non-empty endpoint lists");
        let history = Arc::new(history);
        Arc::new(Self {
            rotator,
            history: history.clone(),
            sources: Sources {
                history,
                assets: Arc::new(assets),
                fees: Arc::new(fees),
            },
            leases: Mutex::new(Vec::new()),
            released: Mutex::new(Vec::new()),
        })
    }
}

impl SourceProvider for RotatingProvider {
    fn lease(&self, user: UserId) -> Sources {
        let lease = self.rotator.next_for_user(user);
        self.leases.lock().unwrap().push((user, lease));
        self.sources.clone()
    }

    fn release(&self, user: UserId) {
        self.rotator.release_user(user);
        self.released.lock().unwrap().push(user);
    }
}
