//! Database models for reconciliation run history.

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use log::error;
use serde::{Deserialize, Serialize};

use sectorscope_core::reconcile::{RunReport, RunStatus, WriteFailure};

/// Database model for run records. List-shaped fields are stored as JSON
/// text columns.
#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::reconcile_runs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct RunDB {
    pub id: String,
    pub started_at: NaiveDateTime,
    pub duration_ms: i64,
    pub leaves_processed: i32,
    pub leaves_failed: String,
    pub securities_confirmed: i32,
    pub securities_demoted: i32,
    pub write_failures: String,
    pub aborted_providers: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        error!("Failed to serialize run report field: {}", e);
        "[]".to_string()
    })
}

fn from_json<T: for<'de> Deserialize<'de> + Default>(raw: &str, run_id: &str) -> T {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        error!("Failed to parse run report field for run {}: {}", run_id, e);
        T::default()
    })
}

impl From<&RunReport> for RunDB {
    fn from(report: &RunReport) -> Self {
        Self {
            id: report.id.clone(),
            started_at: report.started_at.naive_utc(),
            duration_ms: report.duration_ms as i64,
            leaves_processed: report.leaves_processed as i32,
            leaves_failed: to_json(&report.leaves_failed),
            securities_confirmed: report.securities_confirmed as i32,
            securities_demoted: report.securities_demoted as i32,
            write_failures: to_json(&report.write_failures),
            aborted_providers: to_json(&report.aborted_providers),
            status: report.status.as_str().to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

impl From<RunDB> for RunReport {
    fn from(db: RunDB) -> Self {
        let status = RunStatus::parse(&db.status).unwrap_or_else(|| {
            error!("Unknown run status '{}' for run {}", db.status, db.id);
            RunStatus::CompletedWithWarnings
        });
        let leaves_failed: Vec<String> = from_json(&db.leaves_failed, &db.id);
        let write_failures: Vec<WriteFailure> = from_json(&db.write_failures, &db.id);
        let aborted_providers: Vec<String> = from_json(&db.aborted_providers, &db.id);

        Self {
            id: db.id,
            started_at: DateTime::<Utc>::from_naive_utc_and_offset(db.started_at, Utc),
            leaves_processed: db.leaves_processed.max(0) as usize,
            leaves_failed,
            securities_confirmed: db.securities_confirmed.max(0) as usize,
            securities_demoted: db.securities_demoted.max(0) as usize,
            write_failures,
            aborted_providers,
            duration_ms: db.duration_ms.max(0) as u64,
            status,
        }
    }
}
