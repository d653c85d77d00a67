use anyhow::{anyhow, Context, Result};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::pubkey::Pubkey;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info};

use crate::chain::constants::{
    DEFAULT_BLACKLIST_FILE, DEFAULT_HELIUS_BASE_URL, DEFAULT_METEORA_API_URL,
    METEORA_DLMM_PROGRAM_ID,
};

/// Main configuration struct containing all settings
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc: RpcConfig,
    pub helius: HeliusConfig,
    pub meteora: MeteoraConfig,
    pub retry: RetryConfig,
    pub processing: ProcessingConfig,
    pub cache: CacheConfig,
    pub report: ReportConfig,
    pub telegram: TelegramConfig,
    pub logging: LoggingConfig,
}

/// Solana RPC endpoints, rotated per user
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub urls: Vec<String>,
    pub commitment: CommitmentConfig,
    pub timeout_seconds: u64,
    /// Upper bound on signatures read per wallet
    pub signature_limit: usize,
}

/// Helius DAS API access
#[derive(Debug, Clone)]
pub struct HeliusConfig {
    pub api_keys: Vec<String>,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub page_limit: usize,
    pub max_pages: usize,
}

/// Meteora program and REST API
#[derive(Debug, Clone)]
pub struct MeteoraConfig {
    pub program_id: Pubkey,
    pub api_url: String,
    pub timeout_seconds: u64,
}

/// Retry behaviour for remote calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Transactions fetched in parallel for one wallet
    pub tx_fetch_concurrency: usize,
    /// Wallets processed in parallel by the CLI
    pub wallet_concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub max_size: u64,
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub blacklist_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_file: PathBuf,
    pub level: String,
}

impl LoggingConfig {
    /// Read only the logging settings, so the subscriber can be installed
    /// before the rest of the configuration logs anything
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        LoggingConfig {
            log_file: PathBuf::from(get_env_or_default("LOG_FILE", "meteora_analytics.log")),
            level: get_env_or_default("LOG_LEVEL", "info"),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, endpoint files and environment variables
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let rpc_file = get_env_or_default("RPC_URL_FILE", "RPC_URL.txt");
        let helius_file = get_env_or_default("HELIUS_API_KEY_FILE", "HELIUS_API_KEY.txt");

        let rpc = RpcConfig {
            urls: load_endpoints(Path::new(&rpc_file), "RPC_URL")?,
            commitment: parse_commitment(&get_env_or_default("COMMITMENT_LEVEL", "confirmed"))?,
            timeout_seconds: get_u64_env("RPC_TIMEOUT_SECONDS", 30)?,
            signature_limit: get_nonzero_usize_env("SIGNATURE_LIMIT", 1000)?,
        };

        let helius = HeliusConfig {
            api_keys: load_endpoints(Path::new(&helius_file), "HELIUS_API_KEY")?,
            base_url: get_env_or_default("HELIUS_BASE_URL", DEFAULT_HELIUS_BASE_URL),
            timeout_seconds: get_u64_env("HELIUS_TIMEOUT_SECONDS", 30)?,
            page_limit: get_nonzero_usize_env("DAS_PAGE_LIMIT", 1000)?,
            max_pages: get_nonzero_usize_env("DAS_MAX_PAGES", 10)?,
        };

        let meteora = MeteoraConfig {
            program_id: match std::env::var("METEORA_PROGRAM_ID") {
                Ok(value) => Pubkey::from_str(value.trim())
                    .context("Failed to parse METEORA_PROGRAM_ID as Pubkey")?,
                Err(_) => METEORA_DLMM_PROGRAM_ID,
            },
            api_url: get_env_or_default("METEORA_API_URL", DEFAULT_METEORA_API_URL),
            timeout_seconds: get_u64_env("HTTP_TIMEOUT_SECONDS", 10)?,
        };

        let retry = RetryConfig {
            max_retries: get_u32_env("MAX_RETRIES", 3)?,
            initial_interval_ms: get_u64_env("RETRY_INITIAL_MS", 2000)?,
            max_interval_ms: get_u64_env("RETRY_MAX_MS", 10_000)?,
        };

        let processing = ProcessingConfig {
            tx_fetch_concurrency: get_usize_env("TX_FETCH_CONCURRENCY", 1)?.max(1),
            wallet_concurrency: get_usize_env("WALLET_CONCURRENCY", 1)?.max(1),
        };

        let cache = CacheConfig {
            ttl_seconds: get_u64_env("CACHE_TTL_SECONDS", 600)?,
            max_size: get_u64_env("CACHE_MAX_SIZE", 10_000)?,
        };

        let report = ReportConfig {
            output_dir: PathBuf::from(get_env_or_default("OUTPUT_DIR", ".")),
            blacklist_file: PathBuf::from(get_env_or_default(
                "BLACKLIST_FILE",
                DEFAULT_BLACKLIST_FILE,
            )),
        };

        let telegram = TelegramConfig {
            token: std::env::var("TELEGRAM_TOKEN")
                .ok()
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
        };

        let logging = LoggingConfig::load();

        Ok(Config {
            rpc,
            helius,
            meteora,
            retry,
            processing,
            cache,
            report,
            telegram,
            logging,
        })
    }
}

/// Read one endpoint (URL or API key) per line from `path`, skipping blank
/// lines. When the file is missing or empty, fall back to the comma-separated
/// environment variable `env_key`.
pub fn load_endpoints(path: &Path, env_key: &str) -> Result<Vec<String>> {
    match read_endpoint_file(path) {
        Ok(endpoints) => return Ok(endpoints),
        Err(e) => error!(
            "Error loading API endpoints from {}: {}",
            path.display(),
            e
        ),
    }

    let fallback = parse_string_list(&std::env::var(env_key).unwrap_or_default());
    if fallback.is_empty() {
        return Err(anyhow!(
            "No valid endpoints found in {} and no fallback available",
            path.display()
        ));
    }

    info!("Using {} environment variable as fallback", env_key);
    Ok(fallback)
}

fn read_endpoint_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(anyhow!("File {} not found", path.display()));
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let endpoints: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if endpoints.is_empty() {
        return Err(anyhow!("No valid endpoints found in {}", path.display()));
    }
    Ok(endpoints)
}

fn parse_commitment(value: &str) -> Result<CommitmentConfig> {
    let commitment = CommitmentLevel::from_str(value.trim())
        .map_err(|e| anyhow!("Failed to parse COMMITMENT_LEVEL '{}': {}", value, e))?;
    Ok(CommitmentConfig { commitment })
}

// ============================================================================
// Helper Functions for Environment Variable Parsing
// ============================================================================

/// Get environment variable or return default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get u32 environment variable with default
fn get_u32_env(key: &str, default: u32) -> Result<u32> {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .with_context(|| format!("Failed to parse {} as u32", key))
}

/// Get u64 environment variable with default
fn get_u64_env(key: &str, default: u64) -> Result<u64> {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .with_context(|| format!("Failed to parse {} as u64", key))
}

fn get_usize_env(key: &str, default: usize) -> Result<usize> {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .with_context(|| format!("Failed to parse {} as usize", key))
}

/// Like [`get_usize_env`], rejecting zero
fn get_nonzero_usize_env(key: &str, default: usize) -> Result<usize> {
    match get_usize_env(key, default)? {
        0 => Err(anyhow!("{} must be greater than zero", key)),
        value => Ok(value),
    }
}

/// Parse comma-separated string list
fn parse_string_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
