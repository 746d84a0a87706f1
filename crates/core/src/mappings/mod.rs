//! Mappings module - the security→industry mapping store contract.
//!
//! The mapping store is the reconciliation engine's sole write target;
//! everything else reads. Rows are never hard-deleted: a security that
//! drops out of every provider reverts to pending with its industry
//! cleared, preserving audit history.

mod mapping_model;
mod mapping_service;
mod mapping_traits;

pub use mapping_model::{
    IndustryCount, MappingDetails, MappingFilter, MappingPage, MappingStatistics, MappingStatus,
    MappingUpsert, SecurityIndustryMapping, StatusCounts,
};
pub use mapping_service::MappingService;
pub use mapping_traits::MappingRepositoryTrait;
