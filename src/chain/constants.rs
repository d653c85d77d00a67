// Well-known addresses and endpoints used while collecting Meteora metrics.
//
// Program ids are compile-time `Pubkey`s so an invalid address fails the build
// instead of the first request.

use solana_sdk::pubkey::Pubkey;

/// Meteora DLMM program
pub const METEORA_DLMM_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo");

/// Creator of the LP Army certificate collection
pub const CERTIFICATE_CREATOR: &str = "BC11Rk2ZoLxb7tjSpycXDyHnyTdYeaYMgbMwimh8DThX";

/// Substring every certificate name carries
pub const CERTIFICATE_NAME: &str = "Meteora LP Army Certificate";

/// Asset id the first certificate release was minted under
pub const LEGACY_CERTIFICATE_ASSET_ID: &str = "Cw4DD54N14aNNaRdhBCq7W9QQh8Bat812VuFbXbLC8bH";

pub const DEFAULT_HELIUS_BASE_URL: &str = "https://mainnet.helius-rpc.com";
pub const DEFAULT_METEORA_API_URL: &str = "https://dlmm-api.meteora.ag";
pub const DEFAULT_BLACKLIST_FILE: &str = "kelsier_addresses.csv";

/// Page size accepted by `getSignaturesForAddress`
pub const SIGNATURE_PAGE_SIZE: usize = 1000;
