//! Derivative repository and service traits.
//!
//! These traits define the contract for derivative operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;

use super::derivatives_model::{
    DeleteOutcome, Derivative, DerivativeFilter, DerivativeUpdates, NewDerivative, UpdateOutcome,
};
use crate::actions::{Action, ActionFilter};
use crate::errors::Result;

/// Read access to the derivative store.
///
/// Writes go through a [`crate::unit_of_work::UnitOfWork`] so that they are
/// always committed together with their audit action.
pub trait DerivativeRepositoryTrait: Send + Sync {
    /// Retrieves a derivative by its ID, or `None` if it does not exist.
    fn get_by_id(&self, derivative_id: &str) -> Result<Option<Derivative>>;

    /// Lists derivatives matching the filter, ordered by trade date then code.
    fn list(&self, filter: &DerivativeFilter) -> Result<Vec<Derivative>>;
}

/// Trait defining the contract for derivative lifecycle operations.
#[async_trait]
pub trait DerivativeServiceTrait: Send + Sync {
    /// Retrieves a derivative by ID. Absence is a normal outcome.
    fn get_derivative(&self, derivative_id: &str) -> Result<Option<Derivative>>;

    /// Lists derivatives matching the filter.
    fn list_derivatives(&self, filter: &DerivativeFilter) -> Result<Vec<Derivative>>;

    /// Creates a derivative and records an ADD action attributed to `user_id`.
    async fn add_derivative(&self, new_derivative: NewDerivative, user_id: &str)
        -> Result<Derivative>;

    /// Applies updates unless the derivative is absolute.
    async fn update_derivative(
        &self,
        derivative_id: &str,
        user_id: &str,
        updates: DerivativeUpdates,
    ) -> Result<UpdateOutcome>;

    /// Soft-deletes a derivative unless it is absolute.
    async fn delete_derivative(&self, derivative_id: &str, user_id: &str)
        -> Result<DeleteOutcome>;

    /// Lists audit actions matching the filter, newest first.
    fn get_actions(&self, filter: &ActionFilter) -> Result<Vec<Action>>;
}
