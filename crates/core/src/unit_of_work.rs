//! Unit-of-work abstraction for lifecycle operations.
//!
//! Every mutating lifecycle operation writes a derivative and appends the
//! action that audits it. Both writes go through one [`UnitOfWork`] so they
//! commit or roll back together.

use async_trait::async_trait;

use crate::actions::{Action, NewAction};
use crate::derivatives::{Derivative, NewDerivative};
use crate::errors::Result;

/// Transactional view over the derivative store and the action log.
pub trait UnitOfWork {
    /// Looks up a derivative by ID. Returns `None` when no record exists.
    fn find_derivative(&mut self, derivative_id: &str) -> Result<Option<Derivative>>;

    /// Inserts a new derivative; the store assigns its identifier.
    fn insert_derivative(&mut self, new_derivative: NewDerivative) -> Result<Derivative>;

    /// Persists every attribute of an existing derivative.
    fn save_derivative(&mut self, derivative: &Derivative) -> Result<()>;

    /// Appends an action to the log.
    fn append_action(&mut self, new_action: NewAction) -> Result<Action>;
}

/// Runs jobs inside a unit of work with commit-or-rollback semantics.
///
/// Implementations must commit the job's writes iff it returns `Ok`, and
/// discard all of them when it returns `Err`.
#[async_trait]
pub trait UnitOfWorkExecutor: Send + Sync + Clone {
    async fn execute<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T> + Send + 'static,
        T: Send + 'static;
}
