// End-to-end tests of the wallet pipeline over in-memory sources.
//
// Run with:
//   cargo test --test pipeline_tests

mod helpers;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

use helpers::{noon_2024, FakeAssets, FakeFees, FakeHistory, RotatingProvider, WALLET_A, WALLET_B};
use meteora_lp_metrics::analytics::{process_wallets, Blacklist, ProcessorSettings, WalletProcessor};
use meteora_lp_metrics::reporting::{format_report, generate_filename, write_csv_report};
use meteora_lp_metrics::chain::SourceProvider;
use meteora_lp_metrics::utils::RetryPolicy;

fn settings() -> ProcessorSettings {
    ProcessorSettings {
        retry: RetryPolicy::immediate(2),
        ..Default::default()
    }
}

fn fixture() -> Arc<RotatingProvider> {
    let mut history = FakeHistory::default();
    // 2024-01-01 and 2024-01-02 share ISO week 1, 2024-02-10 is in week 6
    history.add_meteora_tx(WALLET_A, "a1", noon_2024(40), "poolY");
    history.add_other_tx(WALLET_A, "a2", noon_2024(20));
    history.add_meteora_tx(WALLET_A, "a3", noon_2024(1), "poolX");
    history.add_meteora_tx(WALLET_A, "a4", noon_2024(0), "poolX");
    // 2024-04-10
    history.add_meteora_tx(WALLET_B, "b1", noon_2024(100), "poolZ");

    let mut assets = FakeAssets::default();
    assets.give_certificate(WALLET_A);

    let mut fees = FakeFees::default();
    fees.set(WALLET_A, "poolX", Decimal::new(255, 1));
    fees.set(WALLET_A, "poolY", Decimal::new(4, 3));

    RotatingProvider::new(history, assets, fees)
}

#[tokio::test]
async fn test_single_wallet_metrics() {
    let provider = fixture();
    let metrics = WalletProcessor::new(
        WALLET_A,
        1,
        provider.clone(),
        Arc::new(Blacklist::default()),
        settings(),
    )
    .process()
    .await;

    assert_eq!(metrics.wallet, WALLET_A);
    assert_eq!(metrics.total_fees, Decimal::new(25504, 3));
    assert_eq!(metrics.pools_with_fees, 1);
    assert_eq!(metrics.first_tx, NaiveDate::from_ymd_opt(2024, 1, 1));
    assert_eq!(metrics.active_weeks, 2);
    assert_eq!(metrics.active_months, 2);
    assert!(metrics.cnft);
    assert!(!metrics.blacklisted);
}

#[tokio::test]
async fn test_batch_keeps_input_order_and_fetches_each_tx_once() {
    let provider = fixture();
    let blacklist = Arc::new(Blacklist::from_addresses([WALLET_B]));
    let wallets = vec![WALLET_A.to_string(), WALLET_B.to_string()];

    let results = process_wallets(&wallets, 42, provider.clone(), blacklist, &settings(), 2).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].wallet, WALLET_A);
    assert_eq!(results[1].wallet, WALLET_B);

    let b = &results[1];
    assert!(b.blacklisted);
    assert!(!b.cnft);
    assert_eq!(b.total_fees, Decimal::ZERO);
    assert_eq!(b.pools_with_fees, 0);
    assert_eq!(b.first_tx_display(), "10.04.2024");
    assert_eq!((b.active_weeks, b.active_months), (1, 1));

    {
        let leases = provider.leases.lock().unwrap();
        assert_eq!(leases.len(), 2);
        assert!(leases.iter().all(|(user, _)| *user == 42));
    }
    // four transactions of A, one of B
    assert_eq!(*provider.history.fetches.lock().unwrap(), 5);
}

#[tokio::test]
async fn test_same_user_leases_rotate_until_released() {
    let provider = fixture();
    let wallets = vec![WALLET_A.to_string(), WALLET_B.to_string()];

    process_wallets(&wallets, 7, provider.clone(), Arc::new(Blacklist::default()), &settings(), 1)
        .await;

    {
        let leases = provider.leases.lock().unwrap();
        let indices: Vec<(usize, usize)> = leases
            .iter()
            .map(|(_, lease)| (lease.rpc_index, lease.helius_index))
            .collect();
        assert_eq!(indices, vec![(0, 0), (1, 1)]);
    }
    assert_eq!(provider.rotator.active_users(), 1);

    provider.release(7);
    assert_eq!(provider.rotator.active_users(), 0);
    assert_eq!(*provider.released.lock().unwrap(), vec![7]);
}

#[tokio::test]
async fn test_reports_from_pipeline_results() {
    let provider = fixture();
    let wallets = vec![WALLET_A.to_string(), WALLET_B.to_string()];
    let blacklist = Arc::new(Blacklist::from_addresses([WALLET_B]));
    let results = process_wallets(&wallets, 0, provider, blacklist, &settings(), 1).await;

    let text = format_report(&results);
    assert!(text.starts_with(&format!("1 Wallet:\n{}\n💵 Total fees claimed: $25.50\n", WALLET_A)));
    assert!(text.contains(&format!("\n\n2 Wallet:\n{}\n", WALLET_B)));
    assert!(text.ends_with("🚫 Blacklist kelsier_addresses: Yes"));

    let dir = tempfile::tempdir().unwrap();
    let path = generate_filename(dir.path(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    write_csv_report(&results, &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(
        headers,
        vec!["№", "Wallet", "Fees$", "Pools", "First Tx Date", "Weeks", "Months", "Blacklist", "сNFT"]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][2], "25.50");
    assert_eq!(&rows[0][4], "01.01.2024");
    assert_eq!(&rows[0][8], "Yes");
    assert_eq!(&rows[1][0], "2");
    assert_eq!(&rows[1][7], "Yes");

    assert_eq!(
        generate_filename(dir.path(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
        dir.path().join("Meteora_20240501_1.csv")
    );
}
