//! Repository implementation for reconciliation run history.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;

use sectorscope_core::reconcile::{RunReport, RunRepositoryTrait};
use sectorscope_core::Result;

use super::model::RunDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::reconcile_runs;

pub struct RunRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl RunRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Most recent runs, newest first.
    pub fn recent_runs(&self, limit: i64) -> Result<Vec<RunReport>> {
        let mut conn = get_connection(&self.pool)?;
        let results = reconcile_runs::table
            .order((
                reconcile_runs::started_at.desc(),
                reconcile_runs::created_at.desc(),
            ))
            .limit(limit.max(1))
            .load::<RunDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(results.into_iter().map(RunReport::from).collect())
    }
}

#[async_trait]
impl RunRepositoryTrait for RunRepository {
    async fn insert_run(&self, report: &RunReport) -> Result<()> {
        let row = RunDB::from(report);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(reconcile_runs::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn latest_run(&self) -> Result<Option<RunReport>> {
        let mut conn = get_connection(&self.pool)?;
        let result = reconcile_runs::table
            .order((
                reconcile_runs::started_at.desc(),
                reconcile_runs::created_at.desc(),
            ))
            .first::<RunDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(result.map(RunReport::from))
    }
}
