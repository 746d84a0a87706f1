//! Security registry service.

use std::collections::HashSet;
use std::sync::Arc;

use log::warn;

use crate::mappings::MappingRepositoryTrait;
use crate::Result;

use super::{normalize_code, NewSecurity, Security, SecurityRepositoryTrait};

/// Outcome of a universe refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniverseRefreshSummary {
    /// Securities accepted into the registry.
    pub accepted: usize,
    /// Records discarded because their code failed normalization.
    pub discarded: usize,
}

/// Service owning the security registry lifecycle.
///
/// A full-universe pull lands here: codes are normalized, unusable records
/// are dropped with a warning, and every accepted security gets a pending
/// mapping row so it participates in the next reconciliation run.
pub struct SecurityService {
    repository: Arc<dyn SecurityRepositoryTrait>,
    mappings: Arc<dyn MappingRepositoryTrait>,
}

impl SecurityService {
    pub fn new(
        repository: Arc<dyn SecurityRepositoryTrait>,
        mappings: Arc<dyn MappingRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            mappings,
        }
    }

    pub fn get_securities(&self) -> Result<Vec<Security>> {
        self.repository.get_securities()
    }

    pub fn get_security(&self, code: &str) -> Result<Option<Security>> {
        self.repository.get_security(code)
    }

    /// Refresh the registry from a provider's full-universe pull.
    ///
    /// Codes are normalized to canonical form before use; duplicates keep
    /// the first occurrence. A security that enters the registry for the
    /// first time gets a pending mapping row (industry unset) so its audit
    /// history starts immediately.
    pub async fn refresh_universe(
        &self,
        incoming: Vec<NewSecurity>,
    ) -> Result<UniverseRefreshSummary> {
        let mut summary = UniverseRefreshSummary::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut accepted: Vec<Security> = Vec::with_capacity(incoming.len());

        for record in incoming {
            let code = match normalize_code(&record.code, record.market) {
                Ok(code) => code,
                Err(e) => {
                    warn!("Discarding security record: {}", e);
                    summary.discarded += 1;
                    continue;
                }
            };

            if !seen.insert(code.clone()) {
                continue;
            }

            accepted.push(Security {
                code,
                name: record.name,
                market: record.market,
            });
        }

        summary.accepted = accepted.len();

        let codes: Vec<String> = accepted.iter().map(|s| s.code.clone()).collect();
        self.repository.upsert_securities(accepted).await?;
        self.mappings.seed_pending(codes).await?;

        Ok(summary)
    }
}
