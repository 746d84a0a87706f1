//! Domain model for industry taxonomy nodes.

use serde::{Deserialize, Serialize};

/// One node of the industry taxonomy.
///
/// Forest invariant: every non-null `parent_code` references an existing
/// node whose level is exactly `level - 1`. Enforced by
/// [`validate_forest`](super::validate_forest) on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryNode {
    /// Stable identifier, unique across the taxonomy.
    pub code: String,
    /// Display name.
    pub name: String,
    /// 1 = top-level sector; deeper levels are sub-sectors.
    pub level: i32,
    /// Parent node code; None only for level-1 nodes.
    pub parent_code: Option<String>,
    /// Inactive nodes are kept for history but never traversed.
    pub is_active: bool,
}
