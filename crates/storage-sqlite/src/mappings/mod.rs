//! SQLite storage implementation for security→industry mappings.

mod model;
mod repository;

pub use model::{MappingDB, MappingDetailsDB};
pub use repository::MappingRepository;
