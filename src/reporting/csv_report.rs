use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

use super::yes_no;
use crate::analytics::WalletMetrics;
use crate::error::MetricsResult;

pub const CSV_HEADERS: [&str; 9] = [
    "№",
    "Wallet",
    "Fees$",
    "Pools",
    "First Tx Date",
    "Weeks",
    "Months",
    "Blacklist",
    "сNFT",
];

/// First free `Meteora_{YYYYMMDD}_{n}.csv` path inside `dir`, `n` from 0
pub fn generate_filename(dir: &Path, date: NaiveDate) -> PathBuf {
    let day = date.format("%Y%m%d");
    let mut counter = 0usize;
    loop {
        let candidate = dir.join(format!("Meteora_{}_{}.csv", day, counter));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Write one row per wallet to `path`
///
/// # Arguments
/// * `results` - Wallet metrics in report order; rows are numbered from 1
/// * `path` - Destination file, created or truncated
///
/// # Errors
/// Returns an error if the file cannot be created or written
pub fn write_csv_report(results: &[WalletMetrics], path: &Path) -> MetricsResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADERS)?;

    for (i, metrics) in results.iter().enumerate() {
        writer.write_record([
            (i + 1).to_string(),
            metrics.wallet.clone(),
            format!("{:.2}", metrics.rounded_fees()),
            metrics.pools_with_fees.to_string(),
            metrics.first_tx_display(),
            metrics.active_weeks.to_string(),
            metrics.active_months.to_string(),
            yes_no(metrics.blacklisted).to_string(),
            yes_no(metrics.cnft).to_string(),
        ])?;
    }
    writer.flush()?;

    info!("CSV report saved as {}", path.display());
    Ok(())
}
