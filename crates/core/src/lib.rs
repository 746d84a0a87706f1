//! Sectorscope Core - Domain entities, services, and the reconciliation engine.
//!
//! This crate contains the business logic for reconciling a universe of
//! securities against a hierarchical industry taxonomy fed by external
//! providers. It is database-agnostic and defines repository traits that
//! are implemented by the `storage-sqlite` crate.

pub mod errors;
pub mod mappings;
pub mod reconcile;
pub mod securities;
pub mod taxonomy;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
