//! Database models for the security registry.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::error;
use serde::{Deserialize, Serialize};

use sectorscope_core::securities::{Market, Security};

/// Database model for securities.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Serialize,
    Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::securities)]
#[diesel(primary_key(code))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct SecurityDB {
    pub code: String,
    pub name: String,
    pub market: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<SecurityDB> for Security {
    fn from(db: SecurityDB) -> Self {
        let market = Market::parse(&db.market).unwrap_or_else(|| {
            error!("Unknown market '{}' for security {}", db.market, db.code);
            Market::A
        });
        Self {
            code: db.code,
            name: db.name,
            market,
        }
    }
}

impl From<Security> for SecurityDB {
    fn from(domain: Security) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            code: domain.code,
            name: domain.name,
            market: domain.market.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
