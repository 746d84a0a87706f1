//! Domain models for the security registry.

use serde::{Deserialize, Serialize};

use sectorscope_providers::models::Market;

use crate::errors::ValidationError;

/// A security known to the registry.
///
/// `code` is always stored in canonical form (see [`normalize_code`]):
/// zero-padded digits, six wide for A-shares and five wide for Hong Kong
/// Connect names. Unique within a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub code: String,
    pub name: String,
    pub market: Market,
}

/// Data for admitting a security into the registry, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSecurity {
    pub code: String,
    pub name: String,
    pub market: Market,
}

/// Normalize a raw security code to its canonical fixed-width form.
///
/// Leading and trailing whitespace is ignored. The digits are zero-padded
/// to the market's width: `"1"` for an A-share becomes `"000001"`, `"700"`
/// for Hong Kong Connect becomes `"00700"`.
///
/// Codes that are empty, contain non-digits, or exceed the market width
/// are rejected; callers discard such records rather than storing them.
pub fn normalize_code(raw: &str, market: Market) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let width = market.code_width();

    if trimmed.is_empty() {
        return Err(ValidationError::InvalidSecurityCode {
            code: raw.to_string(),
            reason: "empty".to_string(),
        });
    }

    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidSecurityCode {
            code: raw.to_string(),
            reason: "contains non-digit characters".to_string(),
        });
    }

    if trimmed.len() > width {
        return Err(ValidationError::InvalidSecurityCode {
            code: raw.to_string(),
            reason: format!("longer than {} digits for market {}", width, market),
        });
    }

    Ok(format!("{:0>width$}", trimmed, width = width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pads_a_share_code() {
        assert_eq!(normalize_code("1", Market::A).unwrap(), "000001");
        assert_eq!(normalize_code("600000", Market::A).unwrap(), "600000");
    }

    #[test]
    fn test_normalize_pads_hk_code() {
        assert_eq!(normalize_code("700", Market::Hk).unwrap(), "00700");
        assert_eq!(normalize_code("1", Market::Hk).unwrap(), "00001");
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize_code(" 600000 ", Market::A).unwrap(), "600000");
    }

    #[test]
    fn test_normalize_rejects_non_digits() {
        let err = normalize_code("12a", Market::A).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidSecurityCode { .. }));
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(normalize_code("", Market::A).is_err());
        assert!(normalize_code("   ", Market::A).is_err());
    }

    #[test]
    fn test_normalize_rejects_overlong() {
        assert!(normalize_code("1234567", Market::A).is_err());
        assert!(normalize_code("123456", Market::Hk).is_err());
    }
}
