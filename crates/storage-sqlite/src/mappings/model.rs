//! Database models for security→industry mappings.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::error;
use serde::{Deserialize, Serialize};

use sectorscope_core::mappings::{MappingDetails, MappingStatus, SecurityIndustryMapping};
use sectorscope_core::securities::Market;

/// Parse a stored status string, falling back to pending on garbage.
fn parse_status(s: &str, security_code: &str) -> MappingStatus {
    MappingStatus::parse(s).unwrap_or_else(|| {
        error!(
            "Unknown mapping status '{}' for security {}",
            s, security_code
        );
        MappingStatus::Pending
    })
}

/// Database model for mapping rows.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Serialize,
    Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::security_industry_mappings)]
#[diesel(primary_key(security_code))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct MappingDB {
    pub security_code: String,
    pub industry_code: Option<String>,
    pub industry_name: Option<String>,
    pub status: String,
    pub confidence: f64,
    pub source: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<MappingDB> for SecurityIndustryMapping {
    fn from(db: MappingDB) -> Self {
        let status = parse_status(&db.status, &db.security_code);
        Self {
            security_code: db.security_code,
            industry_code: db.industry_code,
            industry_name: db.industry_name,
            status,
            confidence: db.confidence,
            source: db.source,
            updated_at: db.updated_at,
        }
    }
}

/// Row shape for the search listing: mapping joined with its security.
#[derive(Queryable, Debug, Clone)]
pub struct MappingDetailsDB {
    pub security_code: String,
    pub industry_code: Option<String>,
    pub industry_name: Option<String>,
    pub status: String,
    pub confidence: f64,
    pub source: Option<String>,
    pub updated_at: NaiveDateTime,
    pub security_name: Option<String>,
    pub market: Option<String>,
}

impl From<MappingDetailsDB> for MappingDetails {
    fn from(db: MappingDetailsDB) -> Self {
        let status = parse_status(&db.status, &db.security_code);
        Self {
            security_code: db.security_code,
            security_name: db.security_name,
            market: db.market.as_deref().and_then(Market::parse),
            industry_code: db.industry_code,
            industry_name: db.industry_name,
            status,
            confidence: db.confidence,
            source: db.source,
            updated_at: db.updated_at,
        }
    }
}
