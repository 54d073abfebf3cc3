//! SQLite storage implementation for Derivatex.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository and unit-of-work traits defined in `derivatex-core`
//! and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The single-writer actor and the transactional unit of work it runs
//! - Repository implementations for derivatives, actions and users
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod actions;
pub mod derivatives;
pub mod users;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    SqliteUnitOfWork, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from derivatex-core for convenience
pub use derivatex_core::errors::{DatabaseError, Error, Result};
