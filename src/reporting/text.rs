use super::yes_no;
use crate::analytics::WalletMetrics;

/// Text block of one wallet, numbered from 1
pub fn format_wallet_result(number: usize, metrics: &WalletMetrics) -> String {
    format!(
        "{} Wallet:\n\
         {}\n\
         💵 Total fees claimed: ${:.2}\n\
         🛀 Pools with claimed fees: {}\n\
         🗓 First tx: {}\n\
         📅 Number of active weeks: {}\n\
         📅 Number of active months: {}\n\
         🖼 LP Army Certificate сNFT: {}\n\
         🚫 Blacklist kelsier_addresses: {}",
        number,
        metrics.wallet,
        metrics.rounded_fees(),
        metrics.pools_with_fees,
        metrics.first_tx_display(),
        metrics.active_weeks,
        metrics.active_months,
        yes_no(metrics.cnft),
        yes_no(metrics.blacklisted),
    )
}

/// All wallet blocks, separated by a blank line
pub fn format_report(results: &[WalletMetrics]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, metrics)| format_wallet_result(i + 1, metrics))
        .collect::<Vec<_>>()
        .join("\n\n")
}
