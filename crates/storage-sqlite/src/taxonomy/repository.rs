//! Repository implementation for the industry taxonomy.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;

use sectorscope_core::taxonomy::{IndustryNode, IndustryNodeRepositoryTrait};
use sectorscope_core::Result;

use super::model::IndustryNodeDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::industry_nodes;

pub struct IndustryNodeRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl IndustryNodeRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl IndustryNodeRepositoryTrait for IndustryNodeRepository {
    fn get_nodes(&self) -> Result<Vec<IndustryNode>> {
        let mut conn = get_connection(&self.pool)?;
        let results = industry_nodes::table
            .order(industry_nodes::code.asc())
            .load::<IndustryNodeDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(results.into_iter().map(IndustryNode::from).collect())
    }

    async fn replace_nodes(&self, nodes: Vec<IndustryNode>) -> Result<usize> {
        let rows: Vec<IndustryNodeDB> = nodes.into_iter().map(IndustryNodeDB::from).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let now = chrono::Utc::now().naive_utc();

                // Nodes absent from the refresh go inactive; history stays.
                diesel::update(industry_nodes::table)
                    .set((
                        industry_nodes::is_active.eq(false),
                        industry_nodes::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let mut written = 0;
                for row in &rows {
                    written += diesel::insert_into(industry_nodes::table)
                        .values(row)
                        .on_conflict(industry_nodes::code)
                        .do_update()
                        .set((
                            industry_nodes::name.eq(&row.name),
                            industry_nodes::level.eq(row.level),
                            industry_nodes::parent_code.eq(&row.parent_code),
                            industry_nodes::is_active.eq(row.is_active),
                            industry_nodes::updated_at.eq(row.updated_at),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(written)
            })
            .await
    }
}
