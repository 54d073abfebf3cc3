//! Derivatex Core - Domain entities, lifecycle rules, services, and traits.
//!
//! This crate contains the business logic for managing derivative contracts
//! and their audit trail. It is database-agnostic and defines traits that are
//! implemented by the `storage-sqlite` crate.

pub mod actions;
pub mod derivatives;
pub mod errors;
pub mod unit_of_work;
pub mod users;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
