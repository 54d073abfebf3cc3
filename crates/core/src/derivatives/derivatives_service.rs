use log::debug;
use std::sync::Arc;

use super::derivatives_lifecycle::LifecycleManager;
use super::derivatives_model::{
    DeleteOutcome, Derivative, DerivativeFilter, DerivativeUpdates, NewDerivative, UpdateOutcome,
};
use super::derivatives_traits::{DerivativeRepositoryTrait, DerivativeServiceTrait};
use crate::actions::{Action, ActionFilter, ActionRepositoryTrait};
use crate::errors::{DatabaseError, Error, Result};
use crate::unit_of_work::{UnitOfWork, UnitOfWorkExecutor};
use crate::utils::time_utils::Clock;

/// Service for managing derivatives (Generic over Executor)
///
/// Each mutating call runs in its own unit of work: the derivative write and
/// its audit action are committed together or not at all.
pub struct DerivativeService<E: UnitOfWorkExecutor> {
    derivative_repository: Arc<dyn DerivativeRepositoryTrait>,
    action_repository: Arc<dyn ActionRepositoryTrait>,
    lifecycle: LifecycleManager,
    executor: E,
}

impl<E: UnitOfWorkExecutor> DerivativeService<E> {
    /// Creates a new DerivativeService instance
    pub fn new(
        derivative_repository: Arc<dyn DerivativeRepositoryTrait>,
        action_repository: Arc<dyn ActionRepositoryTrait>,
        executor: E,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            derivative_repository,
            action_repository,
            lifecycle: LifecycleManager::new(clock),
            executor,
        }
    }
}

/// Loads a derivative that may still be mutated by the lifecycle manager.
fn load_live_derivative(uow: &mut dyn UnitOfWork, derivative_id: &str) -> Result<Derivative> {
    let derivative = uow.find_derivative(derivative_id)?.ok_or_else(|| {
        Error::Database(DatabaseError::NotFound(format!(
            "Derivative {}",
            derivative_id
        )))
    })?;
    if derivative.deleted {
        return Err(Error::ConstraintViolation(format!(
            "Derivative {} has been deleted",
            derivative_id
        )));
    }
    Ok(derivative)
}

#[async_trait::async_trait]
impl<E: UnitOfWorkExecutor> DerivativeServiceTrait for DerivativeService<E> {
    fn get_derivative(&self, derivative_id: &str) -> Result<Option<Derivative>> {
        self.derivative_repository.get_by_id(derivative_id)
    }

    fn list_derivatives(&self, filter: &DerivativeFilter) -> Result<Vec<Derivative>> {
        self.derivative_repository.list(filter)
    }

    async fn add_derivative(
        &self,
        new_derivative: NewDerivative,
        user_id: &str,
    ) -> Result<Derivative> {
        debug!(
            "Adding derivative {} for user {}",
            new_derivative.code, user_id
        );
        let lifecycle = self.lifecycle.clone();
        let user_id = user_id.to_string();

        self.executor
            .execute(move |uow| lifecycle.add_derivative(uow, new_derivative, &user_id))
            .await
    }

    async fn update_derivative(
        &self,
        derivative_id: &str,
        user_id: &str,
        updates: DerivativeUpdates,
    ) -> Result<UpdateOutcome> {
        debug!(
            "Updating derivative {} for user {} ({} proposed updates)",
            derivative_id,
            user_id,
            updates.len()
        );
        let lifecycle = self.lifecycle.clone();
        let derivative_id = derivative_id.to_string();
        let user_id = user_id.to_string();

        self.executor
            .execute(move |uow| {
                let mut derivative = load_live_derivative(uow, &derivative_id)?;
                lifecycle.update_derivative(uow, &mut derivative, &user_id, &updates)
            })
            .await
    }

    async fn delete_derivative(
        &self,
        derivative_id: &str,
        user_id: &str,
    ) -> Result<DeleteOutcome> {
        debug!("Deleting derivative {} for user {}", derivative_id, user_id);
        let lifecycle = self.lifecycle.clone();
        let derivative_id = derivative_id.to_string();
        let user_id = user_id.to_string();

        self.executor
            .execute(move |uow| {
                let mut derivative = load_live_derivative(uow, &derivative_id)?;
                lifecycle.delete_derivative(uow, &mut derivative, &user_id)
            })
            .await
    }

    fn get_actions(&self, filter: &ActionFilter) -> Result<Vec<Action>> {
        self.action_repository.list(filter)
    }
}
