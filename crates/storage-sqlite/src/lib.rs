//! SQLite storage implementation for sectorscope.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in
//! `sectorscope-core` and contains:
//! - Database connection pooling and management
//! - Embedded Diesel migrations
//! - Repository implementations for securities, taxonomy nodes, mappings,
//!   and run history
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies
//! exist. Core stays database-agnostic and works with traits.
//!
//! ```text
//!        core (domain, engine)
//!                 │
//!                 ▼
//!        storage-sqlite (this crate)
//!                 │
//!                 ▼
//!             SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod mappings;
pub mod runs;
pub mod securities;
pub mod taxonomy;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, run_migrations, spawn_writer, DbConnection, DbPool, WriteHandle,
};

// Re-export storage errors
pub use errors::StorageError;

// Re-export from sectorscope-core for convenience
pub use sectorscope_core::errors::{DatabaseError, Error, Result};
