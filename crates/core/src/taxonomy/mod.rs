//! Taxonomy module - the hierarchical industry tree.
//!
//! Nodes form a forest: level-1 nodes are sectors, deeper levels are
//! sub-sectors. The reconciliation engine only ever looks up constituents
//! for leaves (active nodes with no active children).

mod node_model;
mod taxonomy_service;
mod taxonomy_traits;

pub use node_model::IndustryNode;
pub use taxonomy_service::{active_leaves, validate_forest, TaxonomyService};
pub use taxonomy_traits::IndustryNodeRepositoryTrait;
