//! Users module - attribution targets for audit actions.

mod users_model;
mod users_traits;

pub use users_model::{NewUser, User};
pub use users_traits::UserRepositoryTrait;
