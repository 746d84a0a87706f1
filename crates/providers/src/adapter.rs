//! Constituent provider trait definition.
//!
//! This module defines the core `ConstituentProvider` trait that all
//! classification data sources must implement.

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::ConstituentPage;

/// Trait for constituent data providers.
///
/// Implement this trait to add support for a new classification source.
/// An adapter exposes exactly one capability: list the constituent
/// securities of a deepest-level industry node, page by page. The
/// reconciliation engine uses `priority` and `confidence` when candidates
/// from several adapters disagree.
///
/// Adapters enforce their own rate limit (see [`crate::throttle`]) and must
/// not write to any store; fetching is their only side effect.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use sectorscope_providers::{ConstituentProvider, ConstituentPage, ProviderError};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl ConstituentProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn confidence(&self) -> f64 {
///         0.6
///     }
///
///     async fn fetch_constituents(
///         &self,
///         leaf_code: &str,
///         page: u32,
///     ) -> Result<ConstituentPage, ProviderError> {
///         // ... call the remote service
///         # unimplemented!()
///     }
/// }
/// ```
#[async_trait]
pub trait ConstituentProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "SWS", "EASTMONEY", etc.
    /// Used for logging, mapping provenance, and run reports.
    fn id(&self) -> &'static str;

    /// Provider priority for conflict resolution.
    ///
    /// Lower values = higher priority. Default is 10; the primary
    /// classification authority uses 0.
    fn priority(&self) -> u8 {
        10
    }

    /// Confidence attached to mappings produced by this provider.
    ///
    /// 1.0 is reserved for the primary authority; secondary feeds return a
    /// partial value in (0, 1).
    fn confidence(&self) -> f64;

    /// Fetch one page of constituent securities for an industry leaf.
    ///
    /// # Arguments
    ///
    /// * `leaf_code` - Code of a known, active, deepest-level industry node
    /// * `page` - 1-based page number; callers loop until
    ///   [`ConstituentPage::has_more`] is false
    ///
    /// Page size is internal to the adapter.
    async fn fetch_constituents(
        &self,
        leaf_code: &str,
        page: u32,
    ) -> Result<ConstituentPage, ProviderError>;
}
