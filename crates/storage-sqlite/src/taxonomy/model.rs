//! Database models for industry taxonomy nodes.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use sectorscope_core::taxonomy::IndustryNode;

/// Database model for industry nodes.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Serialize,
    Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::industry_nodes)]
#[diesel(primary_key(code))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct IndustryNodeDB {
    pub code: String,
    pub name: String,
    pub level: i32,
    pub parent_code: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<IndustryNodeDB> for IndustryNode {
    fn from(db: IndustryNodeDB) -> Self {
        Self {
            code: db.code,
            name: db.name,
            level: db.level,
            parent_code: db.parent_code,
            is_active: db.is_active,
        }
    }
}

impl From<IndustryNode> for IndustryNodeDB {
    fn from(domain: IndustryNode) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            code: domain.code,
            name: domain.name,
            level: domain.level,
            parent_code: domain.parent_code,
            is_active: domain.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}
