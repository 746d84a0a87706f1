//! Repository implementation for the security registry.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;

use sectorscope_core::securities::{Security, SecurityRepositoryTrait};
use sectorscope_core::Result;

use super::model::SecurityDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::securities;

pub struct SecurityRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SecurityRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SecurityRepositoryTrait for SecurityRepository {
    fn get_securities(&self) -> Result<Vec<Security>> {
        let mut conn = get_connection(&self.pool)?;
        let results = securities::table
            .order(securities::code.asc())
            .load::<SecurityDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(results.into_iter().map(Security::from).collect())
    }

    fn get_security(&self, code: &str) -> Result<Option<Security>> {
        let mut conn = get_connection(&self.pool)?;
        let result = securities::table
            .find(code)
            .first::<SecurityDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(result.map(Security::from))
    }

    async fn upsert_securities(&self, incoming: Vec<Security>) -> Result<usize> {
        if incoming.is_empty() {
            return Ok(0);
        }

        let rows: Vec<SecurityDB> = incoming.into_iter().map(SecurityDB::from).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut written = 0;
                for row in &rows {
                    written += diesel::insert_into(securities::table)
                        .values(row)
                        .on_conflict(securities::code)
                        .do_update()
                        .set((
                            securities::name.eq(&row.name),
                            securities::market.eq(&row.market),
                            securities::updated_at.eq(row.updated_at),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(written)
            })
            .await
    }

    fn count_securities(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = securities::table
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }
}
