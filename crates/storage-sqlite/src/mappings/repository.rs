//! Repository implementation for security→industry mappings.
//!
//! All writes funnel through the single-writer actor, which serializes
//! same-code upserts by construction; reads come straight off the pool.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::SqliteConnection;

use sectorscope_core::mappings::{
    IndustryCount, MappingDetails, MappingFilter, MappingPage, MappingRepositoryTrait,
    MappingStatus, MappingUpsert, SecurityIndustryMapping, StatusCounts,
};
use sectorscope_core::Result;

use super::model::{MappingDB, MappingDetailsDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{securities, security_industry_mappings as mappings};

pub struct MappingRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl MappingRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Insert-or-update one mapping row keyed on its security code.
///
/// `created_at` is written only on first insert; the conflict branch
/// leaves it alone so the row keeps its original entry date.
fn upsert_row(conn: &mut SqliteConnection, row: &MappingUpsert) -> Result<usize> {
    let now = chrono::Utc::now().naive_utc();
    let written = diesel::insert_into(mappings::table)
        .values((
            mappings::security_code.eq(row.security_code()),
            mappings::industry_code.eq(row.industry_code()),
            mappings::industry_name.eq(row.industry_name()),
            mappings::status.eq(row.status().as_str()),
            mappings::confidence.eq(row.confidence()),
            mappings::source.eq(row.source()),
            mappings::created_at.eq(now),
            mappings::updated_at.eq(now),
        ))
        .on_conflict(mappings::security_code)
        .do_update()
        .set((
            mappings::industry_code.eq(row.industry_code()),
            mappings::industry_name.eq(row.industry_name()),
            mappings::status.eq(row.status().as_str()),
            mappings::confidence.eq(row.confidence()),
            mappings::source.eq(row.source()),
            mappings::updated_at.eq(now),
        ))
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(written)
}

#[async_trait]
impl MappingRepositoryTrait for MappingRepository {
    fn get_mappings(&self) -> Result<Vec<SecurityIndustryMapping>> {
        let mut conn = get_connection(&self.pool)?;
        let results = mappings::table
            .order(mappings::security_code.asc())
            .load::<MappingDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(results
            .into_iter()
            .map(SecurityIndustryMapping::from)
            .collect())
    }

    fn get_mapping(&self, security_code: &str) -> Result<Option<SecurityIndustryMapping>> {
        let mut conn = get_connection(&self.pool)?;
        let result = mappings::table
            .find(security_code)
            .first::<MappingDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(result.map(SecurityIndustryMapping::from))
    }

    async fn seed_pending(&self, security_codes: Vec<String>) -> Result<usize> {
        if security_codes.is_empty() {
            return Ok(0);
        }

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let now = chrono::Utc::now().naive_utc();
                let mut created = 0;
                for code in &security_codes {
                    created += diesel::insert_or_ignore_into(mappings::table)
                        .values((
                            mappings::security_code.eq(code),
                            mappings::status.eq(MappingStatus::Pending.as_str()),
                            mappings::confidence.eq(0.0),
                            mappings::created_at.eq(now),
                            mappings::updated_at.eq(now),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(created)
            })
            .await
    }

    async fn upsert(&self, upsert: MappingUpsert) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                upsert_row(conn, &upsert)?;
                Ok(())
            })
            .await
    }

    async fn bulk_upsert(&self, upserts: Vec<MappingUpsert>) -> Result<usize> {
        if upserts.is_empty() {
            return Ok(0);
        }

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut written = 0;
                for row in &upserts {
                    written += upsert_row(conn, row)?;
                }
                Ok(written)
            })
            .await
    }

    fn search_mappings(
        &self,
        filter: &MappingFilter,
        page: i64,
        page_size: i64,
    ) -> Result<MappingPage> {
        let mut conn = get_connection(&self.pool)?;
        let offset = (page - 1).max(0) * page_size;

        let create_base_query = || {
            let mut query = mappings::table
                .left_join(securities::table.on(mappings::security_code.eq(securities::code)))
                .into_boxed();

            if let Some(ref industry_code) = filter.industry_code {
                query = query.filter(mappings::industry_code.eq(industry_code));
            }
            if let Some(status) = filter.status {
                query = query.filter(mappings::status.eq(status.as_str()));
            }
            if let Some(ref keyword) = filter.keyword {
                let pattern = format!("%{}%", keyword);
                query = query.filter(
                    mappings::security_code
                        .like(pattern.clone())
                        .nullable()
                        .or(securities::name.like(pattern).nullable()),
                );
            }

            query
        };

        let total = create_base_query()
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;

        let rows_db = create_base_query()
            .select((
                mappings::security_code,
                mappings::industry_code,
                mappings::industry_name,
                mappings::status,
                mappings::confidence,
                mappings::source,
                mappings::updated_at,
                securities::name.nullable(),
                securities::market.nullable(),
            ))
            .order(mappings::security_code.asc())
            .limit(page_size)
            .offset(offset)
            .load::<MappingDetailsDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(MappingPage {
            rows: rows_db.into_iter().map(MappingDetails::from).collect(),
            total,
        })
    }

    fn counts_by_status(&self) -> Result<StatusCounts> {
        let mut conn = get_connection(&self.pool)?;
        let rows = mappings::table
            .group_by(mappings::status)
            .select((mappings::status, count_star()))
            .load::<(String, i64)>(&mut conn)
            .map_err(StorageError::from)?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            match MappingStatus::parse(&status) {
                Some(MappingStatus::Confirmed) => counts.confirmed += count,
                // Unknown statuses cannot exist through this crate's
                // writers; lump anything else in with pending.
                _ => counts.pending += count,
            }
        }
        Ok(counts)
    }

    fn counts_by_industry(&self) -> Result<Vec<IndustryCount>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = mappings::table
            .filter(mappings::status.eq(MappingStatus::Confirmed.as_str()))
            .filter(mappings::industry_code.is_not_null())
            .group_by((mappings::industry_code, mappings::industry_name))
            .select((mappings::industry_code, mappings::industry_name, count_star()))
            .load::<(Option<String>, Option<String>, i64)>(&mut conn)
            .map_err(StorageError::from)?;

        let mut counts: Vec<IndustryCount> = rows
            .into_iter()
            .filter_map(|(code, name, count)| {
                code.map(|industry_code| IndustryCount {
                    industry_code,
                    industry_name: name,
                    count,
                })
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.industry_code.cmp(&b.industry_code)));
        Ok(counts)
    }
}
