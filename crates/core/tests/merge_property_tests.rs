//! Property tests for merge determinism.
//!
//! Provider fetches complete in arbitrary order; the merge must produce
//! the same winners no matter how the outcome list is permuted.

use proptest::prelude::*;

use sectorscope_core::reconcile::merge::{
    merge_outcomes, LeafFetchResult, LeafOutcome, ProviderOutcome,
};
use sectorscope_core::taxonomy::IndustryNode;
use sectorscope_providers::models::{Constituent, Market};

fn leaf(code: &str, name: &str) -> IndustryNode {
    IndustryNode {
        code: code.to_string(),
        name: name.to_string(),
        level: 1,
        parent_code: None,
        is_active: true,
    }
}

fn constituent(code: &str) -> Constituent {
    Constituent {
        code: code.to_string(),
        name: format!("Security {}", code),
        market: Market::A,
    }
}

fn fetched(leaf_code: &str, rows: Vec<Constituent>) -> LeafOutcome {
    LeafOutcome {
        leaf_code: leaf_code.to_string(),
        result: LeafFetchResult::Fetched(rows),
    }
}

/// Three providers with overlapping universes: a primary, and two
/// secondaries that tie on priority and confidence.
fn fixture_outcomes() -> Vec<ProviderOutcome> {
    vec![
        ProviderOutcome {
            provider_id: "PRIMARY".to_string(),
            priority: 0,
            confidence: 1.0,
            registration: 0,
            aborted: false,
            leaves: vec![
                fetched("801010", vec![constituent("000001"), constituent("000002")]),
                fetched("801780", vec![constituent("600000")]),
            ],
        },
        ProviderOutcome {
            provider_id: "SECONDARY_A".to_string(),
            priority: 10,
            confidence: 0.6,
            registration: 1,
            aborted: false,
            leaves: vec![
                fetched("801010", vec![constituent("600000")]),
                fetched("801780", vec![constituent("000001"), constituent("000004")]),
            ],
        },
        ProviderOutcome {
            provider_id: "SECONDARY_B".to_string(),
            priority: 10,
            confidence: 0.6,
            registration: 2,
            aborted: false,
            leaves: vec![
                fetched("801010", vec![constituent("000004")]),
                fetched("801780", vec![constituent("000002"), constituent("000005")]),
            ],
        },
    ]
}

fn fixture_leaves() -> Vec<IndustryNode> {
    vec![leaf("801010", "Agriculture"), leaf("801780", "Banking")]
}

proptest! {
    #[test]
    fn winners_invariant_under_completion_order(
        permuted in Just(fixture_outcomes()).prop_shuffle()
    ) {
        let leaves = fixture_leaves();
        let baseline = merge_outcomes(fixture_outcomes(), &leaves);
        let shuffled = merge_outcomes(permuted, &leaves);

        prop_assert_eq!(baseline.winners.len(), shuffled.winners.len());
        for (code, winner) in &baseline.winners {
            let other = shuffled.winners.get(code).expect("winner missing");
            prop_assert_eq!(winner, other);
        }
    }

    #[test]
    fn primary_always_wins_its_constituents(
        permuted in Just(fixture_outcomes()).prop_shuffle()
    ) {
        let merged = merge_outcomes(permuted, &fixture_leaves());

        // Securities the primary lists are always attributed to it.
        for code in ["000001", "000002", "600000"] {
            let winner = &merged.winners[code];
            prop_assert_eq!(winner.provider_id.as_str(), "PRIMARY");
            prop_assert_eq!(winner.confidence, 1.0);
        }

        // The secondaries tie; the one registered first wins.
        prop_assert_eq!(merged.winners["000004"].provider_id.as_str(), "SECONDARY_A");
        prop_assert_eq!(merged.winners["000005"].provider_id.as_str(), "SECONDARY_B");
    }
}
