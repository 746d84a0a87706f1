//! Mapping read service for presentation consumers.

use std::sync::Arc;

use crate::reconcile::RunRepositoryTrait;
use crate::Result;

use super::{MappingFilter, MappingPage, MappingRepositoryTrait, MappingStatistics};

/// Read-side service over the mapping store.
///
/// Dashboards and APIs consume this; all writes stay with the
/// reconciliation engine.
pub struct MappingService {
    repository: Arc<dyn MappingRepositoryTrait>,
    runs: Arc<dyn RunRepositoryTrait>,
}

impl MappingService {
    pub fn new(
        repository: Arc<dyn MappingRepositoryTrait>,
        runs: Arc<dyn RunRepositoryTrait>,
    ) -> Self {
        Self { repository, runs }
    }

    /// Filtered, paginated mapping listing. `page` is 1-based; values
    /// below 1 are treated as the first page.
    pub fn search_mappings(
        &self,
        filter: &MappingFilter,
        page: i64,
        page_size: i64,
    ) -> Result<MappingPage> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 500);
        self.repository.search_mappings(filter, page, page_size)
    }

    /// Aggregate statistics: status totals, per-industry distribution,
    /// and when the last reconciliation run started.
    pub fn get_statistics(&self) -> Result<MappingStatistics> {
        let status = self.repository.counts_by_status()?;
        let per_industry = self.repository.counts_by_industry()?;
        let last_run_at = self.runs.latest_run()?.map(|run| run.started_at);

        Ok(MappingStatistics {
            total_confirmed: status.confirmed,
            total_pending: status.pending,
            per_industry,
            last_run_at,
        })
    }
}
