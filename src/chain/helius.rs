use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use tracing::{debug, info, warn};

use super::types::{AssetIndex, DasAsset};
use crate::error::{MetricsError, MetricsResult};

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssetPage {
    items: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct DasResponse {
    #[serde(default)]
    result: Option<AssetPage>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

/// Client for the Helius DAS JSON-RPC API, bound to one API key
pub struct HeliusClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    page_limit: usize,
    max_pages: usize,
}

impl HeliusClient {
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        page_limit: usize,
        max_pages: usize,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            page_limit: page_limit.max(1),
            max_pages: max_pages.max(1),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/?api-key={}", self.base_url.trim_end_matches('/'), self.api_key)
    }

    async fn fetch_page(&self, owner: &str, page: usize) -> MetricsResult<Vec<DasAsset>> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": "1",
            "method": "getAssetsByOwner",
            "params": {
                "ownerAddress": owner,
                "page": page,
                "limit": self.page_limit,
            }
        });

        debug!(
            "Requesting DAS page {} for {} with key {}...",
            page,
            owner,
            key_prefix(&self.api_key)
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        parse_asset_page(response.json::<serde_json::Value>().await?)
    }
}

#[async_trait]
impl AssetIndex for HeliusClient {
    async fn assets_by_owner(&self, owner: &str) -> MetricsResult<Vec<DasAsset>> {
        let assets = collect_asset_pages(self.page_limit, self.max_pages, |page| {
            self.fetch_page(owner, page)
        })
        .await?;

        info!("Found {} assets owned by {}", assets.len(), owner);
        Ok(assets)
    }
}

/// Request pages 1, 2, ... until one comes back shorter than `page_limit`
/// or `max_pages` have been read
pub async fn collect_asset_pages<F, Fut>(
    page_limit: usize,
    max_pages: usize,
    mut fetch_page: F,
) -> MetricsResult<Vec<DasAsset>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = MetricsResult<Vec<DasAsset>>>,
{
    let mut assets = Vec::new();

    for page in 1..=max_pages {
        let items = fetch_page(page).await?;
        let short_page = items.len() < page_limit;
        assets.extend(items);
        if short_page {
            break;
        }
    }

    Ok(assets)
}

/// Interpret one DAS response body. Items that do not decode as an asset
/// are skipped so one odd entry cannot hide the rest of the page.
pub fn parse_asset_page(body: serde_json::Value) -> MetricsResult<Vec<DasAsset>> {
    let response: DasResponse = serde_json::from_value(body)
        .map_err(|e| MetricsError::InvalidResponse(format!("DAS response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(MetricsError::Api(
            error.message.unwrap_or_else(|| "Unknown error".to_string()),
        ));
    }

    let items = response
        .result
        .ok_or_else(|| MetricsError::InvalidResponse("missing 'result' in DAS response".into()))?
        .items
        .ok_or_else(|| MetricsError::InvalidResponse("missing 'items' in DAS response".into()))?;

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let id = item.get("id").cloned();
            match serde_json::from_value::<DasAsset>(item) {
                Ok(asset) => Some(asset),
                Err(e) => {
                    warn!("Skipping DAS asset {:?}: {}", id, e);
                    None
                }
            }
        })
        .collect())
}

fn key_prefix(key: &str) -> &str {
    key.get(..5).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::CertificateMatcher;
    use crate::chain::constants::CERTIFICATE_CREATOR;
    use serde_json::json;

    #[test]
    fn test_parse_asset_page_items() {
        let assets = parse_asset_page(json!({
            "jsonrpc": "2.0",
            "id": "1",
            "result": {
                "total": 2,
                "limit": 1000,
                "page": 1,
                "items": [{ "id": "a" }, { "id": "b" }]
            }
        }))
        .unwrap();

        let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_asset_page_error_payload() {
        let err = parse_asset_page(json!({
            "jsonrpc": "2.0",
            "id": "1",
            "error": { "code": -32429, "message": "rate limited" }
        }))
        .unwrap_err();

        assert!(matches!(err, MetricsError::Api(ref msg) if msg == "rate limited"));
    }

    #[test]
    fn test_parse_asset_page_missing_result() {
        let err = parse_asset_page(json!({ "jsonrpc": "2.0", "id": "1" })).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidResponse(_)));

        let err = parse_asset_page(json!({ "result": { "total": 0 } })).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_asset_page_skips_malformed_items() {
        let assets = parse_asset_page(json!({
            "result": {
                "items": [
                    {
                        "id": "cert",
                        "creators": [{ "address": CERTIFICATE_CREATOR, "verified": true }],
                        "content": { "metadata": { "name": "Meteora LP Army Certificate" } }
                    },
                    { "id": "odd", "creators": null },
                    { "id": "nameless-creator", "creators": [{ "share": 100 }] },
                    { "id": "numeric-name", "name": 7 },
                    "not an object",
                    { "id": "plain" }
                ]
            }
        }))
        .unwrap();

        let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["cert", "odd", "plain"]);

        let found = CertificateMatcher::default().find(&assets).unwrap();
        assert_eq!(found.asset_id, "cert");
    }

    fn asset_page(ids: std::ops::Range<usize>) -> Vec<DasAsset> {
        ids.map(|i| DasAsset {
            id: format!("asset-{}", i),
            creators: Vec::new(),
            content: None,
            name: None,
        })
        .collect()
    }

    #[tokio::test]
    async fn test_collect_asset_pages_stops_on_short_page() {
        let mut requested = Vec::new();
        let assets = collect_asset_pages(2, 10, |page| {
            requested.push(page);
            let items = match page {
                1 => asset_page(0..2),
                2 => asset_page(2..4),
                _ => asset_page(4..5),
            };
            async move { Ok(items) }
        })
        .await
        .unwrap();

        assert_eq!(requested, vec![1, 2, 3]);
        assert_eq!(assets.len(), 5);
        assert_eq!(assets[4].id, "asset-4");
    }

    #[tokio::test]
    async fn test_collect_asset_pages_caps_page_count() {
        let mut requested = 0;
        let assets = collect_asset_pages(2, 3, |page| {
            requested += 1;
            let items = asset_page(page * 2..page * 2 + 2);
            async move { Ok(items) }
        })
        .await
        .unwrap();

        assert_eq!(requested, 3);
        assert_eq!(assets.len(), 6);
    }

    #[tokio::test]
    async fn test_collect_asset_pages_propagates_errors() {
        let err = collect_asset_pages(2, 5, |page| async move {
            if page == 1 {
                Ok(asset_page(0..2))
            } else {
                Err(MetricsError::Api("rate limited".into()))
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, MetricsError::Api(_)));
    }

    #[test]
    fn test_endpoint_and_key_prefix() {
        let client = HeliusClient::new(
            reqwest::Client::new(),
            "https://mainnet.helius-rpc.com/",
            "abcdef123",
            0,
            0,
        );
        assert_eq!(
            client.endpoint(),
            "https://mainnet.helius-rpc.com/?api-key=abcdef123"
        );
        assert_eq!(client.max_pages, 1);
        assert_eq!(client.page_limit, 1);
        assert_eq!(key_prefix("abc"), "abc");
        assert_eq!(key_prefix("abcdefgh"), "abcde");
    }
}
