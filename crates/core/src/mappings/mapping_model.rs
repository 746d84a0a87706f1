//! Domain models for security→industry mappings.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use sectorscope_providers::models::Market;

/// Reconciliation status of a mapping.
///
/// Invariant: `Confirmed` ⇔ industry code present ⇔ confidence > 0.
/// Pending rows always carry a null industry and zero confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStatus {
    /// No authoritative match yet.
    Pending,
    /// Matched by at least one provider in the current or a previous run.
    Confirmed,
}

impl MappingStatus {
    /// Storage identifier for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingStatus::Pending => "pending",
            MappingStatus::Confirmed => "confirmed",
        }
    }

    /// Parse a storage identifier back into a status.
    pub fn parse(s: &str) -> Option<MappingStatus> {
        match s {
            "pending" => Some(MappingStatus::Pending),
            "confirmed" => Some(MappingStatus::Confirmed),
            _ => None,
        }
    }
}

impl std::fmt::Display for MappingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored security→industry mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIndustryMapping {
    /// Canonical security code; at most one row per security.
    pub security_code: String,
    /// Referenced industry node; None means unclassified.
    pub industry_code: Option<String>,
    /// Denormalized copy of the node's name, kept in sync with the code.
    pub industry_name: Option<String>,
    pub status: MappingStatus,
    /// Trust in the assignment: 1.0 for the primary authority, partial
    /// values for secondary-source inferred matches, 0.0 when pending.
    pub confidence: f64,
    /// Provider that produced the current mapping.
    pub source: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl SecurityIndustryMapping {
    pub fn is_confirmed(&self) -> bool {
        self.status == MappingStatus::Confirmed
    }
}

/// A write to the mapping store.
///
/// Constructed only through [`MappingUpsert::confirmed`] and
/// [`MappingUpsert::pending`], so a row can never mix a confirmed status
/// with a missing industry, a pending status with a leftover industry, or
/// an empty-string industry code standing in for "unmapped".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingUpsert {
    security_code: String,
    industry_code: Option<String>,
    industry_name: Option<String>,
    status: MappingStatus,
    confidence: f64,
    source: Option<String>,
}

impl MappingUpsert {
    /// A confirmed assignment of a security to an industry leaf.
    ///
    /// Confidence is clamped into (0.0, 1.0]; a confirmed row with zero
    /// confidence would violate the status invariant.
    pub fn confirmed(
        security_code: impl Into<String>,
        industry_code: impl Into<String>,
        industry_name: impl Into<String>,
        confidence: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            security_code: security_code.into(),
            industry_code: Some(industry_code.into()),
            industry_name: Some(industry_name.into()),
            status: MappingStatus::Confirmed,
            confidence: confidence.clamp(f64::MIN_POSITIVE, 1.0),
            source: Some(source.into()),
        }
    }

    /// A reversion to the unclassified state. Industry and source are
    /// cleared, confidence drops to zero; the row itself stays.
    pub fn pending(security_code: impl Into<String>) -> Self {
        Self {
            security_code: security_code.into(),
            industry_code: None,
            industry_name: None,
            status: MappingStatus::Pending,
            confidence: 0.0,
            source: None,
        }
    }

    pub fn security_code(&self) -> &str {
        &self.security_code
    }

    pub fn industry_code(&self) -> Option<&str> {
        self.industry_code.as_deref()
    }

    pub fn industry_name(&self) -> Option<&str> {
        self.industry_name.as_deref()
    }

    pub fn status(&self) -> MappingStatus {
        self.status
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Filters for listing mappings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingFilter {
    /// Restrict to one industry node.
    pub industry_code: Option<String>,
    /// Restrict to one status.
    pub status: Option<MappingStatus>,
    /// Free-text match against security code or name.
    pub keyword: Option<String>,
}

/// One mapping row joined with its security, for presentation consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDetails {
    pub security_code: String,
    pub security_name: Option<String>,
    pub market: Option<Market>,
    pub industry_code: Option<String>,
    pub industry_name: Option<String>,
    pub status: MappingStatus,
    pub confidence: f64,
    pub source: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// One page of mapping search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingPage {
    pub rows: Vec<MappingDetails>,
    /// Total rows matching the filter, across all pages.
    pub total: i64,
}

/// Mapping counts grouped by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub confirmed: i64,
    pub pending: i64,
}

/// Confirmed-mapping count for one industry node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryCount {
    pub industry_code: String,
    pub industry_name: Option<String>,
    pub count: i64,
}

/// Aggregate statistics for dashboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingStatistics {
    pub total_confirmed: i64,
    pub total_pending: i64,
    pub per_industry: Vec<IndustryCount>,
    pub last_run_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_upsert_holds_invariant() {
        let upsert = MappingUpsert::confirmed("000001", "801010", "Agriculture", 1.0, "SWS");
        assert_eq!(upsert.status(), MappingStatus::Confirmed);
        assert!(upsert.industry_code().is_some());
        assert!(upsert.confidence() > 0.0);
    }

    #[test]
    fn test_confirmed_upsert_clamps_zero_confidence() {
        let upsert = MappingUpsert::confirmed("000001", "801010", "Agriculture", 0.0, "SWS");
        assert!(upsert.confidence() > 0.0);
    }

    #[test]
    fn test_pending_upsert_clears_everything() {
        let upsert = MappingUpsert::pending("000001");
        assert_eq!(upsert.status(), MappingStatus::Pending);
        assert_eq!(upsert.industry_code(), None);
        assert_eq!(upsert.industry_name(), None);
        assert_eq!(upsert.source(), None);
        assert_eq!(upsert.confidence(), 0.0);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [MappingStatus::Pending, MappingStatus::Confirmed] {
            assert_eq!(MappingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MappingStatus::parse("unknown"), None);
    }
}
