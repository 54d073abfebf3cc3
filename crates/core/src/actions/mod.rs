//! Actions module - the append-only audit log of derivative lifecycle events.

mod actions_model;
mod actions_traits;

pub use actions_model::{Action, ActionFilter, ActionType, NewAction};
pub use actions_traits::ActionRepositoryTrait;
