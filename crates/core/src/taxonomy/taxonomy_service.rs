//! Taxonomy service: refresh validation and leaf computation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::errors::ValidationError;
use crate::Result;

use super::{IndustryNode, IndustryNodeRepositoryTrait};

/// Service owning the taxonomy lifecycle.
///
/// The taxonomy is read-mostly; the occasional refresh from the primary
/// authority passes through [`validate_forest`] before anything is
/// persisted.
pub struct TaxonomyService {
    repository: Arc<dyn IndustryNodeRepositoryTrait>,
}

impl TaxonomyService {
    pub fn new(repository: Arc<dyn IndustryNodeRepositoryTrait>) -> Self {
        Self { repository }
    }

    pub fn get_nodes(&self) -> Result<Vec<IndustryNode>> {
        self.repository.get_nodes()
    }

    /// Active leaves, sorted by code ascending.
    pub fn get_active_leaves(&self) -> Result<Vec<IndustryNode>> {
        Ok(active_leaves(&self.repository.get_nodes()?))
    }

    /// Replace the taxonomy after validating the forest invariant.
    pub async fn refresh(&self, nodes: Vec<IndustryNode>) -> Result<usize> {
        validate_forest(&nodes)?;
        self.repository.replace_nodes(nodes).await
    }
}

/// Validate that a node set forms a well-shaped forest.
///
/// Checks: codes unique, levels >= 1, level-1 nodes have no parent, every
/// other node has a parent that exists at exactly `level - 1`. The strict
/// parent-level rule also rules out cycles, so no separate cycle walk is
/// needed.
pub fn validate_forest(nodes: &[IndustryNode]) -> Result<()> {
    let mut by_code: HashMap<&str, &IndustryNode> = HashMap::with_capacity(nodes.len());

    for node in nodes {
        if node.level < 1 {
            return Err(ValidationError::InvalidTaxonomy(format!(
                "node '{}' has level {}",
                node.code, node.level
            ))
            .into());
        }
        if by_code.insert(node.code.as_str(), node).is_some() {
            return Err(ValidationError::InvalidTaxonomy(format!(
                "duplicate node code '{}'",
                node.code
            ))
            .into());
        }
    }

    for node in nodes {
        match (&node.parent_code, node.level) {
            (None, 1) => {}
            (None, level) => {
                return Err(ValidationError::InvalidTaxonomy(format!(
                    "node '{}' at level {} has no parent",
                    node.code, level
                ))
                .into());
            }
            (Some(parent_code), level) => {
                let parent = by_code.get(parent_code.as_str()).ok_or_else(|| {
                    ValidationError::InvalidTaxonomy(format!(
                        "node '{}' references missing parent '{}'",
                        node.code, parent_code
                    ))
                })?;
                if parent.level != level - 1 {
                    return Err(ValidationError::InvalidTaxonomy(format!(
                        "node '{}' at level {} has parent '{}' at level {}",
                        node.code, level, parent.code, parent.level
                    ))
                    .into());
                }
            }
        }
    }

    Ok(())
}

/// Active nodes with no active children, sorted by code ascending.
///
/// These are the units of constituent lookup. Sorting makes traversal,
/// tie-breaking, and logging reproducible across runs.
pub fn active_leaves(nodes: &[IndustryNode]) -> Vec<IndustryNode> {
    let parents_of_active: HashSet<&str> = nodes
        .iter()
        .filter(|n| n.is_active)
        .filter_map(|n| n.parent_code.as_deref())
        .collect();

    let mut leaves: Vec<IndustryNode> = nodes
        .iter()
        .filter(|n| n.is_active && !parents_of_active.contains(n.code.as_str()))
        .cloned()
        .collect();

    leaves.sort_by(|a, b| a.code.cmp(&b.code));
    leaves
}
