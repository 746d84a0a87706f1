//! Run reporting: the sole surface for reconciliation failures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Terminal status of a run.
///
/// Leaf-level and record-level failures never turn a run into an error;
/// they downgrade it to `CompletedWithWarnings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    CompletedWithWarnings,
}

impl RunStatus {
    /// Storage identifier for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::CompletedWithWarnings => "completed_with_warnings",
        }
    }

    /// Parse a storage identifier back into a status.
    pub fn parse(s: &str) -> Option<RunStatus> {
        match s {
            "completed" => Some(RunStatus::Completed),
            "completed_with_warnings" => Some(RunStatus::CompletedWithWarnings),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mapping write that failed even after its individual retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteFailure {
    pub security_code: String,
    pub message: String,
}

/// Aggregate outcome of one reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Unique run identifier.
    pub id: String,
    pub started_at: DateTime<Utc>,
    /// Active leaves in this run's traversal.
    pub leaves_processed: usize,
    /// Leaves that failed or were never reached; treated as uncovered by
    /// the demotion guard.
    pub leaves_failed: Vec<String>,
    /// Confirmed mappings written this run.
    pub securities_confirmed: usize,
    /// Confirmed→pending downgrades written this run.
    pub securities_demoted: usize,
    /// Writes that failed after their individual retry.
    pub write_failures: Vec<WriteFailure>,
    /// Providers that aborted on an authentication failure.
    pub aborted_providers: Vec<String>,
    pub duration_ms: u64,
    pub status: RunStatus,
}

impl RunReport {
    pub fn has_warnings(&self) -> bool {
        self.status == RunStatus::CompletedWithWarnings
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "run {}: {} leaves ({} failed), {} confirmed, {} demoted, {} write failures in {}ms",
            self.id,
            self.leaves_processed,
            self.leaves_failed.len(),
            self.securities_confirmed,
            self.securities_demoted,
            self.write_failures.len(),
            self.duration_ms
        )
    }
}

/// Repository trait for persisted run history.
#[async_trait]
pub trait RunRepositoryTrait: Send + Sync {
    /// Persist a finished run.
    async fn insert_run(&self, report: &RunReport) -> Result<()>;

    /// The most recently started run, if any.
    fn latest_run(&self) -> Result<Option<RunReport>>;
}
