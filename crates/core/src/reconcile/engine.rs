//! The reconciliation engine.
//!
//! One call to [`ReconcileEngine::run`] walks every active taxonomy leaf,
//! pulls constituents from the configured providers, merges the candidates
//! deterministically, and upserts the mapping store. Failures are contained
//! at the narrowest possible scope: a page retries, a leaf fails, an
//! adapter aborts, a write is recorded - the run itself only errors when
//! the mapping store is unreachable.
//!
//! # Architecture
//!
//! ```text
//! ReconcileEngine
//!       │
//!       ├─► IndustryNodeRepository (active leaves)
//!       ├─► SecurityRepository    (the universe to classify)
//!       ├─► ConstituentProviders  (bounded fan-out, serial per adapter)
//!       ├─► MappingRepository     (sole write target)
//!       └─► RunRepository         (run history)
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use uuid::Uuid;

use sectorscope_providers::adapter::ConstituentProvider;
use sectorscope_providers::errors::{ProviderError, RetryClass};
use sectorscope_providers::models::{Constituent, ConstituentPage};

use crate::mappings::{MappingRepositoryTrait, MappingUpsert};
use crate::reconcile::merge::{
    merge_outcomes, LeafFetchResult, LeafOutcome, ProviderOutcome,
};
use crate::reconcile::{CancelToken, RunReport, RunRepositoryTrait, RunStatus, WriteFailure};
use crate::securities::SecurityRepositoryTrait;
use crate::taxonomy::{active_leaves, IndustryNode, IndustryNodeRepositoryTrait};
use crate::Result;

/// Engine configuration.
///
/// Built once per process and passed in at construction; immutable
/// thereafter.
#[derive(Clone, Debug)]
pub struct ReconcileConfig {
    /// Retry budget per page fetch for transient errors.
    pub max_retries: u32,
    /// First backoff delay; doubles per attempt.
    pub base_delay: Duration,
    /// Backoff ceiling.
    pub max_delay: Duration,
    /// How many adapters may fetch at once. Calls to one adapter are
    /// always serial.
    pub max_concurrent_providers: usize,
    /// Rows per bulk-upsert batch.
    pub upsert_chunk_size: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            max_concurrent_providers: 4,
            upsert_chunk_size: 200,
        }
    }
}

/// Exponential backoff: `base * 2^attempt`, capped.
fn backoff_delay(base: Duration, cap: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt)).min(cap)
}

/// What a planned upsert does to the row, for run accounting.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum UpsertKind {
    Confirm,
    Demote,
}

/// Totals from the write phase.
#[derive(Debug, Default)]
struct ApplyOutcome {
    confirmed: usize,
    demoted: usize,
    failures: Vec<WriteFailure>,
}

/// The reconciliation engine.
///
/// Exclusively owns writes to the mapping store. The taxonomy and security
/// repositories are only read during a run.
pub struct ReconcileEngine<T, S, M, R>
where
    T: IndustryNodeRepositoryTrait,
    S: SecurityRepositoryTrait,
    M: MappingRepositoryTrait,
    R: RunRepositoryTrait,
{
    taxonomy_repo: Arc<T>,
    security_repo: Arc<S>,
    mapping_repo: Arc<M>,
    run_repo: Arc<R>,
    /// Adapters in registration order; order breaks priority ties.
    providers: Vec<Arc<dyn ConstituentProvider>>,
    config: ReconcileConfig,
}

impl<T, S, M, R> ReconcileEngine<T, S, M, R>
where
    T: IndustryNodeRepositoryTrait + 'static,
    S: SecurityRepositoryTrait + 'static,
    M: MappingRepositoryTrait + 'static,
    R: RunRepositoryTrait + 'static,
{
    pub fn new(
        taxonomy_repo: Arc<T>,
        security_repo: Arc<S>,
        mapping_repo: Arc<M>,
        run_repo: Arc<R>,
        providers: Vec<Arc<dyn ConstituentProvider>>,
        config: ReconcileConfig,
    ) -> Self {
        Self {
            taxonomy_repo,
            security_repo,
            mapping_repo,
            run_repo,
            providers,
            config,
        }
    }

    /// Execute one reconciliation run.
    ///
    /// Idempotent for identical provider responses. Returns `Err` only
    /// when the mapping store itself is unreachable; every other failure
    /// is contained and lands in the report.
    pub async fn run(&self, cancel: &CancelToken) -> Result<RunReport> {
        let started = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();
        info!("Reconciliation run {} starting", run_id);

        let nodes = self.taxonomy_repo.get_nodes()?;
        let leaves = active_leaves(&nodes);
        let securities = self.security_repo.get_securities()?;
        debug!(
            "Run {}: {} active leaves, {} securities in registry",
            run_id,
            leaves.len(),
            securities.len()
        );

        // Backstop for securities that entered the registry without a
        // mapping row; existing rows are untouched.
        self.mapping_repo
            .seed_pending(securities.iter().map(|s| s.code.clone()).collect())
            .await?;

        let outcomes = self.fetch_phase(&leaves, cancel).await;
        let aborted_providers: Vec<String> = outcomes
            .iter()
            .filter(|o| o.aborted)
            .map(|o| o.provider_id.clone())
            .collect();

        let merged = merge_outcomes(outcomes, &leaves);
        if merged.discarded > 0 {
            warn!(
                "Run {}: discarded {} constituent records with unusable codes",
                run_id, merged.discarded
            );
        }

        let current: HashMap<String, _> = self
            .mapping_repo
            .get_mappings()?
            .into_iter()
            .map(|m| (m.security_code.clone(), m))
            .collect();

        let mut plan: Vec<(MappingUpsert, UpsertKind)> = Vec::new();
        for security in &securities {
            if let Some(candidate) = merged.winners.get(&security.code) {
                plan.push((
                    MappingUpsert::confirmed(
                        security.code.clone(),
                        candidate.industry_code.clone(),
                        candidate.industry_name.clone(),
                        candidate.confidence,
                        candidate.provider_id.clone(),
                    ),
                    UpsertKind::Confirm,
                ));
                continue;
            }

            let Some(existing) = current.get(&security.code) else {
                // Freshly seeded pending row; nothing to write.
                continue;
            };
            if !existing.is_confirmed() {
                // pending -> pending is a no-op.
                continue;
            }

            let leaf_uncovered = existing
                .industry_code
                .as_deref()
                .is_some_and(|code| merged.uncovered_leaves.contains(code));
            if leaf_uncovered {
                // The leaf was not covered this run; keeping the previous
                // mapping avoids false demotion on a partial outage.
                debug!(
                    "Run {}: keeping {} under uncovered leaf",
                    run_id, security.code
                );
                continue;
            }

            plan.push((MappingUpsert::pending(security.code.clone()), UpsertKind::Demote));
        }

        let applied = self.apply_upserts(plan, cancel).await?;

        let leaves_failed: Vec<String> = merged.uncovered_leaves.into_iter().collect();
        let status = if leaves_failed.is_empty()
            && applied.failures.is_empty()
            && aborted_providers.is_empty()
        {
            RunStatus::Completed
        } else {
            RunStatus::CompletedWithWarnings
        };

        let report = RunReport {
            id: run_id,
            started_at,
            leaves_processed: leaves.len(),
            leaves_failed,
            securities_confirmed: applied.confirmed,
            securities_demoted: applied.demoted,
            write_failures: applied.failures,
            aborted_providers,
            duration_ms: started.elapsed().as_millis() as u64,
            status,
        };

        if let Err(e) = self.run_repo.insert_run(&report).await {
            warn!("Failed to persist report for run {}: {}", report.id, e);
        }

        info!("{}", report.summary());
        Ok(report)
    }

    /// Fan the leaf walk out across adapters, bounded by configuration.
    /// Each adapter walks the leaf list serially; its own rate limiter
    /// paces the calls.
    async fn fetch_phase(
        &self,
        leaves: &[IndustryNode],
        cancel: &CancelToken,
    ) -> Vec<ProviderOutcome> {
        let walks = self
            .providers
            .iter()
            .cloned()
            .enumerate()
            .map(|(registration, provider)| {
                self.fetch_provider(provider, registration, leaves, cancel)
            });

        stream::iter(walks)
            .buffer_unordered(self.config.max_concurrent_providers.max(1))
            .collect()
            .await
    }

    /// Walk every leaf against one adapter, in traversal order.
    async fn fetch_provider(
        &self,
        provider: Arc<dyn ConstituentProvider>,
        registration: usize,
        leaves: &[IndustryNode],
        cancel: &CancelToken,
    ) -> ProviderOutcome {
        let provider_id = provider.id().to_string();
        let mut aborted = false;
        let mut results = Vec::with_capacity(leaves.len());

        for node in leaves {
            if aborted || cancel.is_cancelled() {
                results.push(LeafOutcome {
                    leaf_code: node.code.clone(),
                    result: LeafFetchResult::Skipped,
                });
                continue;
            }

            let result = match self.fetch_leaf(provider.as_ref(), &node.code).await {
                Ok(rows) => {
                    debug!(
                        "{}: leaf {} yielded {} constituents",
                        provider_id,
                        node.code,
                        rows.len()
                    );
                    LeafFetchResult::Fetched(rows)
                }
                Err(e) => {
                    if e.retry_class() == RetryClass::AbortProvider {
                        error!(
                            "{}: aborting remaining leaves after auth failure: {}",
                            provider_id, e
                        );
                        aborted = true;
                    } else {
                        warn!("{}: leaf {} failed: {}", provider_id, node.code, e);
                    }
                    LeafFetchResult::Failed(e.to_string())
                }
            };

            results.push(LeafOutcome {
                leaf_code: node.code.clone(),
                result,
            });
        }

        ProviderOutcome {
            provider_id,
            priority: provider.priority(),
            confidence: provider.confidence(),
            registration,
            aborted,
            leaves: results,
        }
    }

    /// Fetch every page of one leaf.
    async fn fetch_leaf(
        &self,
        provider: &dyn ConstituentProvider,
        leaf_code: &str,
    ) -> std::result::Result<Vec<Constituent>, ProviderError> {
        let mut rows = Vec::new();
        let mut page: u32 = 1;

        loop {
            let fetched = self.fetch_page(provider, leaf_code, page).await?;
            rows.extend(fetched.constituents);
            if !fetched.has_more {
                return Ok(rows);
            }
            page += 1;
        }
    }

    /// Fetch one page, retrying transient errors with exponential backoff.
    async fn fetch_page(
        &self,
        provider: &dyn ConstituentProvider,
        leaf_code: &str,
        page: u32,
    ) -> std::result::Result<ConstituentPage, ProviderError> {
        let mut attempt: u32 = 0;

        loop {
            match provider.fetch_constituents(leaf_code, page).await {
                Ok(fetched) => return Ok(fetched),
                Err(e)
                    if e.retry_class() == RetryClass::WithBackoff
                        && attempt < self.config.max_retries =>
                {
                    let delay =
                        backoff_delay(self.config.base_delay, self.config.max_delay, attempt);
                    debug!(
                        "{}: leaf {} page {} attempt {} failed ({}), retrying in {:?}",
                        provider.id(),
                        leaf_code,
                        page,
                        attempt + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Apply the planned upserts in chunks. A failed chunk falls back to
    /// per-row writes with one retry each; rows that still fail are
    /// recorded. Only an unreachable store propagates as an error.
    async fn apply_upserts(
        &self,
        plan: Vec<(MappingUpsert, UpsertKind)>,
        cancel: &CancelToken,
    ) -> Result<ApplyOutcome> {
        let mut outcome = ApplyOutcome::default();
        let chunk_size = self.config.upsert_chunk_size.max(1);

        for chunk in plan.chunks(chunk_size) {
            if cancel.is_cancelled() {
                warn!("Run cancelled before all planned writes were applied");
                break;
            }

            let rows: Vec<MappingUpsert> = chunk.iter().map(|(u, _)| u.clone()).collect();
            match self.mapping_repo.bulk_upsert(rows).await {
                Ok(_) => {
                    for (_, kind) in chunk {
                        outcome.count(*kind);
                    }
                }
                Err(e) if e.is_store_unavailable() => return Err(e),
                Err(e) => {
                    warn!(
                        "Bulk upsert of {} rows failed ({}), retrying rows individually",
                        chunk.len(),
                        e
                    );
                    for (upsert, kind) in chunk {
                        match self.upsert_with_retry(upsert).await {
                            Ok(()) => outcome.count(*kind),
                            Err(e) if e.is_store_unavailable() => return Err(e),
                            Err(e) => outcome.failures.push(WriteFailure {
                                security_code: upsert.security_code().to_string(),
                                message: e.to_string(),
                            }),
                        }
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// One write plus one retry.
    async fn upsert_with_retry(&self, upsert: &MappingUpsert) -> Result<()> {
        match self.mapping_repo.upsert(upsert.clone()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_store_unavailable() => Err(e),
            Err(e) => {
                debug!("Retrying upsert for {}: {}", upsert.security_code(), e);
                self.mapping_repo.upsert(upsert.clone()).await
            }
        }
    }
}

impl ApplyOutcome {
    fn count(&mut self, kind: UpsertKind) {
        match kind {
            UpsertKind::Confirm => self.confirmed += 1,
            UpsertKind::Demote => self.demoted += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let base = Duration::from_millis(500);
        let cap = Duration::from_secs(4);
        assert_eq!(backoff_delay(base, cap, 0), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, cap, 1), Duration::from_secs(1));
        assert_eq!(backoff_delay(base, cap, 2), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, cap, 3), Duration::from_secs(4));
        assert_eq!(backoff_delay(base, cap, 10), Duration::from_secs(4));
    }
}
