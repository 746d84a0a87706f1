//! Traits for taxonomy persistence.

use async_trait::async_trait;

use crate::Result;

use super::IndustryNode;

/// Repository trait for the industry taxonomy.
#[async_trait]
pub trait IndustryNodeRepositoryTrait: Send + Sync {
    /// All nodes, active and inactive, ordered by code ascending.
    fn get_nodes(&self) -> Result<Vec<IndustryNode>>;

    /// Replace the taxonomy with a new node set: upsert every incoming
    /// node and deactivate nodes that are no longer present. Returns the
    /// number of rows written.
    async fn replace_nodes(&self, nodes: Vec<IndustryNode>) -> Result<usize>;
}
