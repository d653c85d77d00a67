use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

use super::types::FeeSource;
use crate::error::{MetricsError, MetricsResult};

/// Client for the public Meteora DLMM REST API
pub struct MeteoraApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl MeteoraApiClient {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    fn earning_url(&self, wallet: &str, pool: &str) -> String {
        format!(
            "{}/wallet/{}/{}/earning",
            self.base_url.trim_end_matches('/'),
            wallet,
            pool
        )
    }
}

#[async_trait]
impl FeeSource for MeteoraApiClient {
    async fn claimed_fees(&self, wallet: &str, pool: &str) -> MetricsResult<Decimal> {
        let body: Value = self
            .http_client
            .get(self.earning_url(wallet, pool))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let fees = parse_claimed_fees(&body)?;
        debug!("Pool {} claimed fees for {}: ${}", pool, wallet, fees);
        Ok(fees)
    }
}

/// Read `total_fee_usd_claimed` from an earning response. The API reports it
/// either as a JSON number or as a numeric string; a missing field means zero.
pub fn parse_claimed_fees(body: &Value) -> MetricsResult<Decimal> {
    match body.get("total_fee_usd_claimed") {
        None | Some(Value::Null) => Ok(Decimal::ZERO),
        Some(Value::Number(number)) => parse_decimal(&number.to_string()),
        Some(Value::String(text)) => parse_decimal(text.trim()),
        Some(other) => Err(MetricsError::InvalidResponse(format!(
            "unexpected total_fee_usd_claimed: {}",
            other
        ))),
    }
}

fn parse_decimal(text: &str) -> MetricsResult<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| MetricsError::InvalidResponse(format!("fee value '{}': {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_numeric_fee() {
        let fees = parse_claimed_fees(&json!({ "total_fee_usd_claimed": 12.345 })).unwrap();
        assert_eq!(fees, Decimal::from_str("12.345").unwrap());
    }

    #[test]
    fn test_parse_string_and_scientific_fee() {
        let fees = parse_claimed_fees(&json!({ "total_fee_usd_claimed": "3.5" })).unwrap();
        assert_eq!(fees, Decimal::from_str("3.5").unwrap());

        let fees = parse_claimed_fees(&json!({ "total_fee_usd_claimed": 1.5e-5 })).unwrap();
        assert_eq!(fees, Decimal::from_str("0.000015").unwrap());
    }

    #[test]
    fn test_missing_fee_is_zero() {
        assert_eq!(parse_claimed_fees(&json!({})).unwrap(), Decimal::ZERO);
        assert_eq!(
            parse_claimed_fees(&json!({ "total_fee_usd_claimed": null })).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_invalid_fee_is_error() {
        assert!(parse_claimed_fees(&json!({ "total_fee_usd_claimed": [1] })).is_err());
        assert!(parse_claimed_fees(&json!({ "total_fee_usd_claimed": "abc" })).is_err());
    }

    #[test]
    fn test_earning_url() {
        let client = MeteoraApiClient::new(reqwest::Client::new(), "https://dlmm-api.meteora.ag/");
        assert_eq!(
            client.earning_url("wallet1", "pool1"),
            "https://dlmm-api.meteora.ag/wallet/wallet1/pool1/earning"
        );
    }
}
