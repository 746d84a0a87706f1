//! SQLite storage implementation for the industry taxonomy.

mod model;
mod repository;

pub use model::IndustryNodeDB;
pub use repository::IndustryNodeRepository;
