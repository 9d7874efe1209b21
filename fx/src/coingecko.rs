//! CoinGecko "simple price" rate provider.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use payrelay_common::{CurrencyPair, ExchangeRate};
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{info, warn};

use crate::error::{FxError, FxResult};
use crate::provider::RateProvider;

/// Public CoinGecko API root.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Header carrying the CoinGecko API key.
pub const API_KEY_HEADER: &str = "x-cg-pro-api-key";

/// `{ asset_id: { fiat: rate } }`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

/// CoinGecko client configuration.
#[derive(Clone)]
pub struct CoinGeckoConfig {
    /// API root, without the `/simple/price` suffix.
    pub base_url: String,
    /// Optional API key, sent as a header.
    pub api_key: Option<String>,
    /// Timeout for one outbound request.
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for CoinGeckoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoinGeckoConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Fetches rates from the CoinGecko simple price endpoint.
pub struct CoinGeckoProvider {
    client: Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoProvider {
    /// Create a provider with its own HTTP client.
    pub fn new(config: CoinGeckoConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/simple/price", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RateProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    async fn get_rate(&self, pair: &CurrencyPair) -> FxResult<ExchangeRate> {
        let mut builder = self
            .client
            .get(self.endpoint())
            .query(&[("ids", pair.asset.as_str()), ("vs_currencies", pair.fiat.as_str())])
            .header(ACCEPT, "application/json");
        if let Some(key) = &self.config.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        let request = builder
            .build()
            .map_err(|e| FxError::unavailable(pair, e))?;
        let url = request.url().to_string();

        info!(url = %url, "Requesting rate from CoinGecko");

        let response = self.client.execute(request).await.map_err(|e| {
            warn!(url = %url, error = %e, "CoinGecko request failed");
            FxError::unavailable(pair, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = %status, body = %body, "CoinGecko returned an error status");
            return Err(FxError::unavailable(pair, format!("HTTP {}", status)));
        }

        let prices: SimplePriceResponse = response.json().await.map_err(|e| {
            warn!(url = %url, error = %e, "Malformed CoinGecko response");
            FxError::unavailable(pair, e)
        })?;

        let value = prices
            .get(&pair.asset)
            .and_then(|quotes| quotes.get(&pair.fiat))
            .copied()
            .ok_or_else(|| {
                warn!(url = %url, "CoinGecko response has no rate for pair");
                FxError::unavailable(pair, "pair missing from response")
            })?;

        ExchangeRate::new(value, self.name()).map_err(|e| {
            warn!(url = %url, value = e.0, "CoinGecko returned an unusable rate");
            FxError::InvalidRate {
                pair: pair.clone(),
                value: e.0,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn_fake_api(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Echoes a fixed price table, filtered to the requested pair.
    async fn simple_price(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let table = json!({
            "tether": { "rub": 90.5, "usd": 1.0 },
            "bitcoin": { "usd": 0.0 },
        });
        let ids = params.get("ids").cloned().unwrap_or_default();
        let fiat = params.get("vs_currencies").cloned().unwrap_or_default();
        let mut quotes = serde_json::Map::new();
        if let Some(rate) = table[&ids].get(&fiat) {
            quotes.insert(fiat, rate.clone());
        }
        if quotes.is_empty() {
            return Json(json!({}));
        }
        let mut body = serde_json::Map::new();
        body.insert(ids, Value::Object(quotes));
        Json(Value::Object(body))
    }

    fn provider_for(base_url: String, api_key: Option<&str>) -> CoinGeckoProvider {
        CoinGeckoProvider::new(CoinGeckoConfig {
            base_url,
            api_key: api_key.map(str::to_string),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetches_rate() {
        let base = spawn_fake_api(Router::new().route("/simple/price", get(simple_price))).await;
        let provider = provider_for(base, None);

        let rate = provider
            .get_rate(&CurrencyPair::from_symbols("USDT", "rub"))
            .await
            .unwrap();

        assert_eq!(rate.value(), 90.5);
        assert_eq!(rate.source, "CoinGecko");
    }

    #[tokio::test]
    async fn test_zero_rate_is_invalid() {
        let base = spawn_fake_api(Router::new().route("/simple/price", get(simple_price))).await;
        let provider = provider_for(base, None);

        let result = provider.get_rate(&CurrencyPair::from_symbols("btc", "usd")).await;

        assert!(matches!(result, Err(FxError::InvalidRate { value, .. }) if value == 0.0));
    }

    #[tokio::test]
    async fn test_missing_pair_is_unavailable() {
        let base = spawn_fake_api(Router::new().route("/simple/price", get(simple_price))).await;
        let provider = provider_for(base, None);

        let result = provider.get_rate(&CurrencyPair::from_symbols("xyz", "rub")).await;

        assert!(matches!(result, Err(FxError::RateUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let router = Router::new().route(
            "/simple/price",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
        );
        let base = spawn_fake_api(router).await;
        let provider = provider_for(base, None);

        let result = provider.get_rate(&CurrencyPair::from_symbols("usdt", "rub")).await;

        match result {
            Err(FxError::RateUnavailable { reason, .. }) => assert!(reason.contains("429")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sends_api_key() {
        let router = Router::new().route(
            "/simple/price",
            get(|headers: HeaderMap| async move {
                match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
                    Some("secret") => Ok(Json(json!({ "ethereum": { "eur": 3000.0 } }))),
                    _ => Err(StatusCode::UNAUTHORIZED),
                }
            }),
        );
        let base = spawn_fake_api(router).await;
        let pair = CurrencyPair::from_symbols("eth", "eur");

        let authorized = provider_for(base.clone(), Some("secret"));
        assert_eq!(authorized.get_rate(&pair).await.unwrap().value(), 3000.0);

        let anonymous = provider_for(base, None);
        assert!(anonymous.get_rate(&pair).await.is_err());
    }

    #[tokio::test]
    async fn test_connection_failure_is_unavailable() {
        // Nothing listens on the discard port.
        let provider = provider_for("http://127.0.0.1:9".to_string(), None);

        let result = provider.get_rate(&CurrencyPair::from_symbols("usdt", "rub")).await;

        assert!(matches!(result, Err(FxError::RateUnavailable { .. })));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = CoinGeckoConfig {
            api_key: Some("CG-secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("CG-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
