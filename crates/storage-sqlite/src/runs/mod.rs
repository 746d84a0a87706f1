//! SQLite storage implementation for reconciliation run history.

mod model;
mod repository;

pub use model::RunDB;
pub use repository::RunRepository;
