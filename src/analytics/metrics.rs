use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Date format used for the first Meteora transaction in every report
pub const FIRST_TX_FORMAT: &str = "%d.%m.%Y";

/// Meteora activity of a single wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletMetrics {
    pub wallet: String,
    /// Sum of claimed fees over every pool, in USD
    pub total_fees: Decimal,
    /// Pools whose claimed fees reach the reporting threshold
    pub pools_with_fees: usize,
    pub first_tx: Option<NaiveDate>,
    pub active_weeks: usize,
    pub active_months: usize,
    pub cnft: bool,
    pub blacklisted: bool,
}

impl WalletMetrics {
    pub fn empty(wallet: impl Into<String>) -> Self {
        Self {
            wallet: wallet.into(),
            total_fees: Decimal::ZERO,
            pools_with_fees: 0,
            first_tx: None,
            active_weeks: 0,
            active_months: 0,
            cnft: false,
            blacklisted: false,
        }
    }

    /// `DD.MM.YYYY`, or `N/A` without any Meteora transaction
    pub fn first_tx_display(&self) -> String {
        self.first_tx
            .map(|d| d.format(FIRST_TX_FORMAT).to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Total fees rounded to cents
    pub fn rounded_fees(&self) -> Decimal {
        self.total_fees.round_dp(2)
    }
}
