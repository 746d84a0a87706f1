//! Provider-neutral model types.

use serde::{Deserialize, Serialize};

/// Market a security trades on.
///
/// The market determines the canonical fixed-width form of a security code:
/// six digits for mainland A-shares, five for Hong Kong Connect names.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Market {
    /// Mainland A-shares (Shanghai / Shenzhen).
    A,
    /// Hong Kong Connect.
    #[serde(rename = "HK")]
    Hk,
}

impl Market {
    /// Width of the canonical zero-padded code for this market.
    pub fn code_width(&self) -> usize {
        match self {
            Market::A => 6,
            Market::Hk => 5,
        }
    }

    /// Storage identifier for this market.
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::A => "A",
            Market::Hk => "HK",
        }
    }

    /// Parse a storage identifier back into a market.
    pub fn parse(s: &str) -> Option<Market> {
        match s {
            "A" => Some(Market::A),
            "HK" => Some(Market::Hk),
            _ => None,
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One constituent security as reported by a provider, before normalization.
///
/// Codes are passed through exactly as the upstream returned them; the
/// reconciliation engine owns normalization and discards what it cannot
/// normalize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constituent {
    /// Raw security code from the provider.
    pub code: String,
    /// Display name from the provider.
    pub name: String,
    /// Market the adapter resolved for this row.
    pub market: Market,
}

/// One page of constituent results.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstituentPage {
    /// Constituents on this page, in provider order.
    pub constituents: Vec<Constituent>,
    /// Whether another page exists after this one.
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_code_width() {
        assert_eq!(Market::A.code_width(), 6);
        assert_eq!(Market::Hk.code_width(), 5);
    }

    #[test]
    fn test_market_round_trip() {
        for market in [Market::A, Market::Hk] {
            assert_eq!(Market::parse(market.as_str()), Some(market));
        }
        assert_eq!(Market::parse("US"), None);
    }
}
