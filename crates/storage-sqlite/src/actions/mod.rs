//! SQLite storage implementation for the action log.

mod model;
mod repository;

pub use model::ActionDB;
pub use repository::ActionRepository;
pub(crate) use model::format_timestamp;
