use chrono::{DateTime, Datelike, NaiveDate};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashSet;

use crate::chain::types::TransactionSummary;

/// Position of the pool (lb pair) account in Meteora DLMM instructions
pub const POOL_ACCOUNT_INDEX: usize = 2;

pub fn is_meteora_transaction(tx: &TransactionSummary, program_id: &Pubkey) -> bool {
    let program = program_id.to_string();
    tx.instructions.iter().any(|ix| ix.program_id == program)
}

/// Pool addresses touched by the Meteora instructions of `tx`.
///
/// Instructions too short to carry a pool account are skipped.
pub fn pool_addresses(tx: &TransactionSummary, program_id: &Pubkey) -> Vec<String> {
    let program = program_id.to_string();
    tx.instructions
        .iter()
        .filter(|ix| ix.program_id == program)
        .filter_map(|ix| ix.accounts.get(POOL_ACCOUNT_INDEX).cloned())
        .collect()
}

fn utc_date(timestamp: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

/// UTC date of the earliest timestamp
pub fn first_activity_date(timestamps: &[i64]) -> Option<NaiveDate> {
    timestamps.iter().copied().min().and_then(utc_date)
}

/// Distinct ISO weeks and calendar months covered by `timestamps`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityCounts {
    pub weeks: usize,
    pub months: usize,
}

pub fn activity_counts(timestamps: &[i64]) -> ActivityCounts {
    let mut weeks = HashSet::new();
    let mut months = HashSet::new();

    for date in timestamps.iter().copied().filter_map(utc_date) {
        let iso = date.iso_week();
        weeks.insert((iso.year(), iso.week()));
        months.insert((date.year(), date.month()));
    }

    ActivityCounts {
        weeks: weeks.len(),
        months: months.len(),
    }
}
