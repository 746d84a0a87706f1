//! Error types and retry classification for constituent providers.
//!
//! Every [`ProviderError`] maps to exactly one [`RetryClass`] via
//! [`retry_class`](ProviderError::retry_class); the reconciliation engine
//! uses the class, never the variant, to decide what happens next.

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors returned by constituent provider adapters.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider throttled the request (HTTP 429 or an in-band quota
    /// rejection). Transient.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that throttled the request
        provider: String,
    },

    /// The request timed out. Transient.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider answered with a server-side failure (5xx or an in-band
    /// error payload). Transient.
    #[error("Upstream error: {provider} - HTTP {status}: {message}")]
    Upstream {
        /// The provider that failed
        provider: String,
        /// HTTP status code, 0 when the failure was in-band
        status: u16,
        /// Error detail from the response
        message: String,
    },

    /// The response did not match the expected schema. The leaf is skipped
    /// and logged; retrying would return the same payload.
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse {
        /// The provider that returned the payload
        provider: String,
        /// What failed to parse
        message: String,
    },

    /// Authentication was rejected. Fatal for this adapter's remaining work
    /// in the current run.
    #[error("Authentication failed: {provider}")]
    AuthFailed {
        /// The provider that rejected the credentials
        provider: String,
    },

    /// A transport-level error occurred before a response was read.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ProviderError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use sectorscope_providers::errors::{ProviderError, RetryClass};
    ///
    /// let error = ProviderError::RateLimited { provider: "SWS".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = ProviderError::AuthFailed { provider: "SWS".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::AbortProvider);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited { .. } | Self::Timeout { .. } | Self::Upstream { .. } => {
                RetryClass::WithBackoff
            }

            // Connection resets and DNS hiccups behave like timeouts.
            Self::Network(_) => RetryClass::WithBackoff,

            Self::MalformedResponse { .. } => RetryClass::SkipLeaf,

            Self::AuthFailed { .. } => RetryClass::AbortProvider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_retries_with_backoff() {
        let error = ProviderError::RateLimited {
            provider: "SWS".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_timeout_retries_with_backoff() {
        let error = ProviderError::Timeout {
            provider: "EASTMONEY".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_upstream_retries_with_backoff() {
        let error = ProviderError::Upstream {
            provider: "SWS".to_string(),
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_malformed_response_skips_leaf() {
        let error = ProviderError::MalformedResponse {
            provider: "EASTMONEY".to_string(),
            message: "missing field `data`".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::SkipLeaf);
    }

    #[test]
    fn test_auth_failure_aborts_provider() {
        let error = ProviderError::AuthFailed {
            provider: "SWS".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::AbortProvider);
    }

    #[test]
    fn test_error_display() {
        let error = ProviderError::RateLimited {
            provider: "SWS".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: SWS");

        let error = ProviderError::Upstream {
            provider: "EASTMONEY".to_string(),
            status: 500,
            message: "internal error".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Upstream error: EASTMONEY - HTTP 500: internal error"
        );
    }
}
