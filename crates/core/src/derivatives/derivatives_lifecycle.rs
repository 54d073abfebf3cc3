//! Derivative lifecycle manager.
//!
//! Orchestrates the absolute-state guard, the diff engine, the derivative
//! store and the action log for a single operation. The caller supplies the
//! unit of work; this module never opens or commits transactions itself.

use std::sync::Arc;

use log::{debug, info, warn};

use super::derivatives_diff::compute_diff;
use super::derivatives_model::{
    DeleteOutcome, Derivative, DerivativeUpdates, NewDerivative, UpdateOutcome,
};
use crate::actions::NewAction;
use crate::errors::Result;
use crate::unit_of_work::UnitOfWork;
use crate::utils::time_utils::Clock;

#[derive(Clone)]
pub struct LifecycleManager {
    clock: Arc<dyn Clock>,
}

impl LifecycleManager {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Looks up a derivative. A missing record is `Ok(None)`, not an error.
    pub fn get_derivative(
        &self,
        uow: &mut dyn UnitOfWork,
        derivative_id: &str,
    ) -> Result<Option<Derivative>> {
        uow.find_derivative(derivative_id)
    }

    /// Persists a new derivative and records an ADD action.
    ///
    /// Creation is allowed for derivatives that are already absolute.
    pub fn add_derivative(
        &self,
        uow: &mut dyn UnitOfWork,
        new_derivative: NewDerivative,
        user_id: &str,
    ) -> Result<Derivative> {
        new_derivative.validate()?;

        let derivative = uow.insert_derivative(new_derivative)?;
        uow.append_action(NewAction::add(&derivative.id, user_id, self.clock.now()))?;

        info!(
            "Derivative {} ({}) added by user {}",
            derivative.id, derivative.code, user_id
        );
        Ok(derivative)
    }

    /// Soft-deletes a derivative and records a DELETE action.
    ///
    /// Absolute derivatives are left untouched and no action is recorded.
    /// `derivative` is only modified once both writes have succeeded.
    pub fn delete_derivative(
        &self,
        uow: &mut dyn UnitOfWork,
        derivative: &mut Derivative,
        user_id: &str,
    ) -> Result<DeleteOutcome> {
        let now = self.clock.now();
        if derivative.is_absolute(now.date_naive()) {
            warn!(
                "Refusing to delete absolute derivative {} traded on {}",
                derivative.id, derivative.date_of_trade
            );
            return Ok(DeleteOutcome::RejectedImmutable);
        }

        let mut deleted = derivative.clone();
        deleted.deleted = true;
        uow.save_derivative(&deleted)?;
        uow.append_action(NewAction::delete(&deleted.id, user_id, now))?;

        *derivative = deleted;
        info!("Derivative {} deleted by user {}", derivative.id, user_id);
        Ok(DeleteOutcome::Deleted)
    }

    /// Applies `updates` and records an UPDATE action carrying the change log.
    ///
    /// Absolute derivatives are rejected without touching any attribute. The
    /// updated derivative must pass the same checks as a new one, otherwise
    /// nothing is written. A mutable derivative always gets an action, even
    /// when nothing changed.
    pub fn update_derivative(
        &self,
        uow: &mut dyn UnitOfWork,
        derivative: &mut Derivative,
        user_id: &str,
        updates: &DerivativeUpdates,
    ) -> Result<UpdateOutcome> {
        let now = self.clock.now();
        if derivative.is_absolute(now.date_naive()) {
            warn!(
                "Refusing to update absolute derivative {} traded on {}",
                derivative.id, derivative.date_of_trade
            );
            return Ok(UpdateOutcome::RejectedImmutable);
        }

        let mut updated = derivative.clone();
        let changes = compute_diff(&mut updated, updates);
        debug!(
            "Derivative {}: {} of {} proposed updates change a value",
            updated.id,
            changes.len(),
            updates.len()
        );
        updated.validate()?;

        uow.save_derivative(&updated)?;
        uow.append_action(NewAction::update(
            &updated.id,
            user_id,
            now,
            changes.clone(),
        ))?;

        *derivative = updated;
        info!(
            "Derivative {} updated by user {} ({} changes)",
            derivative.id,
            user_id,
            changes.len()
        );
        Ok(UpdateOutcome::Applied { changes })
    }
}
