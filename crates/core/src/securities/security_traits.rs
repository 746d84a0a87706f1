//! Traits for the security registry repository.

use async_trait::async_trait;

use crate::Result;

use super::Security;

/// Repository trait for security registry persistence.
#[async_trait]
pub trait SecurityRepositoryTrait: Send + Sync {
    /// All securities in the registry, ordered by code ascending.
    fn get_securities(&self) -> Result<Vec<Security>>;

    /// Look up one security by canonical code.
    fn get_security(&self, code: &str) -> Result<Option<Security>>;

    /// Insert or update securities by code. Returns the number of rows
    /// written.
    async fn upsert_securities(&self, securities: Vec<Security>) -> Result<usize>;

    /// Number of securities in the registry.
    fn count_securities(&self) -> Result<i64>;
}
