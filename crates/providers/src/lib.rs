//! Constituent data providers for sectorscope.
//!
//! This crate defines the `ConstituentProvider` capability interface and the
//! concrete adapters that implement it against external classification
//! sources. Each adapter knows how to list the constituent securities of one
//! industry leaf, page by page, and enforces its own rate limit; nothing in
//! this crate writes to any store.
//!
//! Adapters:
//! - [`sws::SwsProvider`] — Shenwan Research index service, the primary
//!   classification authority.
//! - [`eastmoney::EastmoneyProvider`] — EastMoney board constituents, a
//!   secondary market-data feed.

pub mod adapter;
pub mod errors;
pub mod eastmoney;
pub mod models;
pub mod sws;
pub mod throttle;

pub use adapter::ConstituentProvider;
pub use errors::{ProviderError, RetryClass};
pub use models::{Constituent, ConstituentPage, Market};
pub use throttle::{RateLimitConfig, RateLimiter};
