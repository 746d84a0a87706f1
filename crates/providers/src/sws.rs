//! Shenwan Research (SWS) constituent provider.
//!
//! Fetches component stocks of a Shenwan industry index from the SWS index
//! publishing service. This is the primary classification authority:
//! priority 0, confidence 1.0.
//!
//! The service only covers mainland A-shares and paginates with 1-based
//! page numbers; pages are sized by [`PAGE_SIZE`] and the response carries a
//! `total` row count.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::adapter::ConstituentProvider;
use crate::errors::ProviderError;
use crate::models::{Constituent, ConstituentPage, Market};
use crate::throttle::{RateLimitConfig, RateLimiter};

const BASE_URL: &str = "https://www.swsresearch.com/institute-sw/api/index_publish/details/component_stocks/";
const PROVIDER_ID: &str = "SWS";

/// Rows requested per page.
const PAGE_SIZE: u32 = 50;

// ============================================================================
// API Response Structures
// ============================================================================

/// One page of component stocks.
#[derive(Debug, Deserialize)]
struct ComponentStocksResponse {
    /// Component rows for the requested page.
    #[serde(default)]
    data: Vec<ComponentStock>,
    /// Total component count across all pages.
    total: u64,
}

/// Individual component stock row.
#[derive(Debug, Deserialize)]
struct ComponentStock {
    /// Exchange code of the stock, e.g. "000001".
    stock_code: String,
    /// Display name of the stock.
    stock_name: String,
}

// ============================================================================
// SwsProvider
// ============================================================================

/// Shenwan Research component-stocks provider.
pub struct SwsProvider {
    client: Client,
    limiter: RateLimiter,
}

impl SwsProvider {
    /// Create a provider with the default rate limit (20 requests/minute,
    /// the observed tolerance of the public endpoint).
    pub fn new() -> Self {
        Self::with_rate_limit(RateLimitConfig {
            requests_per_minute: 20,
            burst_capacity: 3.0,
        })
    }

    /// Create a provider with a custom rate limit.
    pub fn with_rate_limit(config: RateLimitConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            limiter: RateLimiter::new(config),
        }
    }

    /// Fetch one page from the component-stocks endpoint.
    async fn fetch_page(
        &self,
        leaf_code: &str,
        page: u32,
    ) -> Result<ComponentStocksResponse, ProviderError> {
        self.limiter.acquire().await;

        let page_str = page.to_string();
        let page_size_str = PAGE_SIZE.to_string();
        let params = [
            ("swindexcode", leaf_code),
            ("page", page_str.as_str()),
            ("page_size", page_size_str.as_str()),
        ];

        debug!("SWS request: leaf {} page {}", leaf_code, page);

        let response = self
            .client
            .get(BASE_URL)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    ProviderError::Network(e)
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::AuthFailed {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream {
                provider: PROVIDER_ID.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::MalformedResponse {
                provider: PROVIDER_ID.to_string(),
                message: format!("unexpected HTTP {}: {}", status, body),
            });
        }

        let body = response.text().await.map_err(ProviderError::Network)?;
        parse_component_stocks(&body)
    }
}

impl Default for SwsProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a component-stocks payload, mapping schema mismatches to
/// `MalformedResponse`.
fn parse_component_stocks(body: &str) -> Result<ComponentStocksResponse, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse {
        provider: PROVIDER_ID.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl ConstituentProvider for SwsProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        0
    }

    fn confidence(&self) -> f64 {
        1.0
    }

    async fn fetch_constituents(
        &self,
        leaf_code: &str,
        page: u32,
    ) -> Result<ConstituentPage, ProviderError> {
        let response = self.fetch_page(leaf_code, page).await?;

        let constituents = response
            .data
            .into_iter()
            .map(|row| Constituent {
                code: row.stock_code,
                name: row.stock_name,
                market: Market::A,
            })
            .collect::<Vec<_>>();

        let has_more = u64::from(page) * u64::from(PAGE_SIZE) < response.total;

        Ok(ConstituentPage {
            constituents,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_component_stocks() {
        let body = r#"{
            "data": [
                {"stock_code": "000001", "stock_name": "Ping An Bank"},
                {"stock_code": "600036", "stock_name": "China Merchants Bank"}
            ],
            "total": 42
        }"#;

        let parsed = parse_component_stocks(body).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].stock_code, "000001");
        assert_eq!(parsed.total, 42);
    }

    #[test]
    fn test_parse_empty_page() {
        let body = r#"{"data": [], "total": 0}"#;
        let parsed = parse_component_stocks(body).unwrap();
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn test_parse_rejects_unexpected_schema() {
        let body = r#"{"rows": [], "count": 0}"#;
        let err = parse_component_stocks(body).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }

    #[test]
    fn test_provider_identity() {
        let provider = SwsProvider::new();
        assert_eq!(provider.id(), "SWS");
        assert_eq!(provider.priority(), 0);
        assert_eq!(provider.confidence(), 1.0);
    }
}
