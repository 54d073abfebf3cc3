//! SQLite storage implementation for derivatives.

mod model;
mod repository;

pub use model::{DerivativeChangesetDB, DerivativeDB};
pub use repository::DerivativeRepository;
