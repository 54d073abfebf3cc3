use crate::actions::actions_model::{Action, ActionFilter};
use crate::errors::Result;

/// Read access to the action log.
///
/// Appends happen only inside a [`crate::unit_of_work::UnitOfWork`], together
/// with the derivative mutation they audit.
pub trait ActionRepositoryTrait: Send + Sync {
    /// Retrieves an action by its ID, or `None` if it does not exist.
    fn get_by_id(&self, action_id: &str) -> Result<Option<Action>>;

    /// Lists actions matching the filter, newest first.
    fn list(&self, filter: &ActionFilter) -> Result<Vec<Action>>;
}
