//! Securities module - the registry of known securities.
//!
//! The registry is the universe the reconciliation engine classifies.
//! It is populated by a full-universe pull and read-only during a run.

mod security_model;
mod security_service;
mod security_traits;

pub use security_model::{normalize_code, NewSecurity, Security};
pub use security_service::{SecurityService, UniverseRefreshSummary};
pub use security_traits::SecurityRepositoryTrait;

// Re-export the market enum from the providers crate; both crates speak
// the same market vocabulary.
pub use sectorscope_providers::models::Market;
