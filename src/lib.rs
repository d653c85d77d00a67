// Meteora LP Metrics Library
//
// Collects Meteora DLMM liquidity-provider activity for Solana wallets:
// - Signature history and transaction lookups over rotating RPC endpoints
// - LP Army certificate detection through the Helius DAS API
// - Claimed fee totals from the Meteora DLMM API
// - Text and CSV reports, served by a CLI and a Telegram bot

pub mod analytics;
pub mod chain;
pub mod config;
pub mod error;
pub mod logging;
pub mod reporting;
#[cfg(feature = "telegram")]
pub mod telegram;
pub mod utils;

pub use analytics::{ProcessorSettings, WalletMetrics, WalletProcessor};
pub use config::Config;
pub use error::{MetricsError, MetricsResult};
