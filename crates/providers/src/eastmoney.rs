//! EastMoney board constituent provider.
//!
//! Fetches the constituent list of an industry board from the EastMoney
//! quote-list endpoint. This is a secondary market-data feed: mappings it
//! produces are inferred from board membership, so it reports priority 10
//! and confidence 0.6.
//!
//! Unlike SWS, the endpoint covers both mainland A-shares and Hong Kong
//! Connect names; a per-row market flag (`f13`) distinguishes them. The
//! payload is also looser than the SWS one: `data` is null for an unknown
//! or empty board, which is treated as an empty final page rather than an
//! error.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::adapter::ConstituentProvider;
use crate::errors::ProviderError;
use crate::models::{Constituent, ConstituentPage, Market};
use crate::throttle::{RateLimitConfig, RateLimiter};

const BASE_URL: &str = "https://push2.eastmoney.com/api/qt/clist/get";
const PROVIDER_ID: &str = "EASTMONEY";

/// Rows requested per page.
const PAGE_SIZE: u32 = 100;

/// EastMoney market flag for Hong Kong listings.
const MARKET_FLAG_HK: i64 = 116;

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct ClistResponse {
    /// Null when the board is unknown or has no rows.
    data: Option<ClistData>,
}

#[derive(Debug, Deserialize)]
struct ClistData {
    /// Total rows across all pages.
    total: u64,
    /// Rows for the requested page.
    #[serde(default)]
    diff: Vec<ClistRow>,
}

/// Individual constituent row. EastMoney uses positional field names.
#[derive(Debug, Deserialize)]
struct ClistRow {
    /// Security code.
    f12: String,
    /// Display name.
    f14: String,
    /// Market flag; 116 marks Hong Kong listings.
    f13: Option<i64>,
}

// ============================================================================
// EastmoneyProvider
// ============================================================================

/// EastMoney board constituent provider.
pub struct EastmoneyProvider {
    client: Client,
    limiter: RateLimiter,
}

impl EastmoneyProvider {
    /// Create a provider with the default rate limit.
    pub fn new() -> Self {
        Self::with_rate_limit(RateLimitConfig::default())
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

    /// Fetch one page from the clist endpoint.
    async fn fetch_page(&self, leaf_code: &str, page: u32) -> Result<ClistResponse, ProviderError> {
        self.limiter.acquire().await;

        let board = format!("b:{}", leaf_code);
        let page_str = page.to_string();
        let page_size_str = PAGE_SIZE.to_string();
        let params = [
            ("fs", board.as_str()),
            ("pn", page_str.as_str()),
            ("pz", page_size_str.as_str()),
            ("fields", "f12,f13,f14"),
        ];

        debug!("EastMoney request: board {} page {}", leaf_code, page);

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
        parse_clist(&body)
    }
}

impl Default for EastmoneyProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a clist payload, mapping schema mismatches to `MalformedResponse`.
fn parse_clist(body: &str) -> Result<ClistResponse, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse {
        provider: PROVIDER_ID.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl ConstituentProvider for EastmoneyProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn confidence(&self) -> f64 {
        0.6
    }

    async fn fetch_constituents(
        &self,
        leaf_code: &str,
        page: u32,
    ) -> Result<ConstituentPage, ProviderError> {
        let response = self.fetch_page(leaf_code, page).await?;

        let Some(data) = response.data else {
            return Ok(ConstituentPage::default());
        };

        let constituents = data
            .diff
            .into_iter()
            .map(|row| {
                let market = if row.f13 == Some(MARKET_FLAG_HK) {
                    Market::Hk
                } else {
                    Market::A
                };
                Constituent {
                    code: row.f12,
                    name: row.f14,
                    market,
                }
            })
            .collect::<Vec<_>>();

        let has_more = u64::from(page) * u64::from(PAGE_SIZE) < data.total;

        Ok(ConstituentPage {
            constituents,
            has_more,
        })
    }
}
