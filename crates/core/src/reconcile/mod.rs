//! Reconciliation module - the engine that produces mapping upserts.
//!
//! One invocation of [`ReconcileEngine::run`] is one reconciliation run:
//! a full pass over all active taxonomy leaves producing a consistent
//! upsert batch to the mapping store plus a [`RunReport`].

mod cancel;
mod engine;
pub mod merge;
mod report;


pub use cancel::CancelToken;
pub use engine::{ReconcileConfig, ReconcileEngine};
pub use report::{RunReport, RunRepositoryTrait, RunStatus, WriteFailure};
