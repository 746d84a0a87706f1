//! Traits for the mapping store access layer.

use async_trait::async_trait;

use crate::Result;

use super::{
    IndustryCount, MappingFilter, MappingPage, MappingUpsert, SecurityIndustryMapping,
    StatusCounts,
};

/// Repository trait for security→industry mapping persistence.
///
/// Contract: `upsert` is safe to call concurrently for different security
/// codes and serializes writes to the same code (last-writer-wins by
/// `updated_at`). `bulk_upsert` preserves the same per-row semantics.
#[async_trait]
pub trait MappingRepositoryTrait: Send + Sync {
    /// All mapping rows, ordered by security code ascending.
    fn get_mappings(&self) -> Result<Vec<SecurityIndustryMapping>>;

    /// Look up one mapping by canonical security code.
    fn get_mapping(&self, security_code: &str) -> Result<Option<SecurityIndustryMapping>>;

    /// Create pending rows for securities that have none yet; existing
    /// rows are left untouched. Returns the number of rows created.
    async fn seed_pending(&self, security_codes: Vec<String>) -> Result<usize>;

    /// Insert or update one mapping keyed on its security code.
    async fn upsert(&self, upsert: MappingUpsert) -> Result<()>;

    /// Upsert a batch with per-row `upsert` semantics. Returns the number
    /// of rows written.
    async fn bulk_upsert(&self, upserts: Vec<MappingUpsert>) -> Result<usize>;

    /// Filtered, paginated listing joined with the security registry.
    /// `page` is 1-based.
    fn search_mappings(
        &self,
        filter: &MappingFilter,
        page: i64,
        page_size: i64,
    ) -> Result<MappingPage>;

    /// Row counts grouped by status.
    fn counts_by_status(&self) -> Result<StatusCounts>;

    /// Confirmed-row counts grouped by industry node, largest first.
    fn counts_by_industry(&self) -> Result<Vec<IndustryCount>>;
}
