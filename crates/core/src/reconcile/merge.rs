//! Deterministic merging of provider outcomes into winning candidates.
//!
//! Provider fetches run concurrently, but the merge is defined entirely in
//! terms of a fixed order: providers sorted by (priority, registration
//! order), leaves in traversal order, constituents in page order. Whatever
//! order the fetches *complete* in, the same winners come out.

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};

use sectorscope_providers::models::Constituent;

use crate::securities::normalize_code;
use crate::taxonomy::IndustryNode;

/// Everything one provider produced during the fetch phase.
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    pub provider_id: String,
    pub priority: u8,
    pub confidence: f64,
    /// Position in the engine's provider list; breaks priority ties.
    pub registration: usize,
    /// True when the provider hit an auth failure and stopped early.
    pub aborted: bool,
    /// Per-leaf results in traversal order.
    pub leaves: Vec<LeafOutcome>,
}

/// Result of fetching one leaf from one provider.
#[derive(Debug, Clone)]
pub struct LeafOutcome {
    pub leaf_code: String,
    pub result: LeafFetchResult,
}

/// How a leaf fetch ended.
#[derive(Debug, Clone)]
pub enum LeafFetchResult {
    /// All pages fetched; constituents concatenated in page order.
    Fetched(Vec<Constituent>),
    /// Retries exhausted or the response was malformed.
    Failed(String),
    /// Never attempted (provider aborted earlier, or run cancelled).
    Skipped,
}

/// A winning candidate mapping for one security.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Canonical security code.
    pub security_code: String,
    pub security_name: String,
    pub industry_code: String,
    pub industry_name: String,
    pub provider_id: String,
    pub priority: u8,
    pub confidence: f64,
}

/// Merged view of a fetch phase.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Winner per canonical security code.
    pub winners: HashMap<String, Candidate>,
    /// Leaves not fully covered this run (failed or skipped by any
    /// provider). Securities confirmed under these leaves are exempt from
    /// demotion.
    pub uncovered_leaves: BTreeSet<String>,
    /// Constituent rows dropped because their code failed normalization.
    pub discarded: usize,
}

/// Whether `challenger` beats `incumbent` under the tie-break rule:
/// higher source priority first (lower number), then higher confidence.
/// Equal on both counts keeps the incumbent, which in merge order is the
/// candidate discovered first.
fn beats(challenger: &Candidate, incumbent: &Candidate) -> bool {
    if challenger.priority != incumbent.priority {
        return challenger.priority < incumbent.priority;
    }
    challenger.confidence > incumbent.confidence
}

/// Merge provider outcomes into winning candidates.
///
/// Input order does not matter; outcomes are sorted into the canonical
/// merge order internally.
pub fn merge_outcomes(mut outcomes: Vec<ProviderOutcome>, leaves: &[IndustryNode]) -> MergeOutcome {
    let leaf_names: HashMap<&str, &str> = leaves
        .iter()
        .map(|n| (n.code.as_str(), n.name.as_str()))
        .collect();

    outcomes.sort_by_key(|o| (o.priority, o.registration));

    let mut merged = MergeOutcome::default();

    for outcome in &outcomes {
        for leaf in &outcome.leaves {
            let constituents = match &leaf.result {
                LeafFetchResult::Fetched(rows) => rows,
                LeafFetchResult::Failed(reason) => {
                    debug!(
                        "Leaf {} uncovered by {}: {}",
                        leaf.leaf_code, outcome.provider_id, reason
                    );
                    merged.uncovered_leaves.insert(leaf.leaf_code.clone());
                    continue;
                }
                LeafFetchResult::Skipped => {
                    merged.uncovered_leaves.insert(leaf.leaf_code.clone());
                    continue;
                }
            };

            let industry_name = leaf_names
                .get(leaf.leaf_code.as_str())
                .copied()
                .unwrap_or_default();

            for row in constituents {
                let code = match normalize_code(&row.code, row.market) {
                    Ok(code) => code,
                    Err(e) => {
                        warn!("Discarding constituent from {}: {}", outcome.provider_id, e);
                        merged.discarded += 1;
                        continue;
                    }
                };

                let candidate = Candidate {
                    security_code: code.clone(),
                    security_name: row.name.clone(),
                    industry_code: leaf.leaf_code.clone(),
                    industry_name: industry_name.to_string(),
                    provider_id: outcome.provider_id.clone(),
                    priority: outcome.priority,
                    confidence: outcome.confidence,
                };

                let replace = match merged.winners.get(&code) {
                    Some(incumbent) => beats(&candidate, incumbent),
                    None => true,
                };
                if replace {
                    merged.winners.insert(code, candidate);
                }
            }
        }
    }

    merged
}
