//! In-memory store used by unit tests.
//!
//! Implements the unit of work, its executor and the read repositories over a
//! single `Mutex`-guarded state. The executor runs each job against a copy of
//! the state and only swaps it in when the job succeeds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rust_decimal_macros::dec;

use crate::actions::{Action, ActionFilter, ActionRepositoryTrait, NewAction};
use crate::derivatives::{Derivative, DerivativeFilter, DerivativeRepositoryTrait, NewDerivative};
use crate::errors::{DatabaseError, Error, Result};
use crate::unit_of_work::{UnitOfWork, UnitOfWorkExecutor};

/// The fixed "current date" tests run against.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn sample_new_derivative() -> NewDerivative {
    NewDerivative {
        code: "doe".to_string(),
        buying_party: "foo".to_string(),
        selling_party: "bar".to_string(),
        asset: "Stocks".to_string(),
        quantity: 1,
        strike_price: dec!(20.20),
        notional_curr_code: "USD".to_string(),
        date_of_trade: today(),
        maturity_date: today() + Duration::days(365),
    }
}

#[derive(Clone, Default)]
struct StoreState {
    derivatives: Vec<Derivative>,
    actions: Vec<Action>,
    next_action: u64,
}

impl StoreState {
    fn find_derivative(&self, derivative_id: &str) -> Option<Derivative> {
        self.derivatives
            .iter()
            .find(|d| d.id == derivative_id)
            .cloned()
    }

    fn insert_derivative(&mut self, new_derivative: NewDerivative) -> Derivative {
        let derivative = Derivative::from_new(uuid::Uuid::new_v4().to_string(), new_derivative);
        self.derivatives.push(derivative.clone());
        derivative
    }

    fn save_derivative(&mut self, derivative: &Derivative) -> Result<()> {
        let slot = self
            .derivatives
            .iter_mut()
            .find(|d| d.id == derivative.id)
            .ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(format!(
                    "Derivative {}",
                    derivative.id
                )))
            })?;
        *slot = derivative.clone();
        Ok(())
    }

    fn append_action(&mut self, new_action: NewAction, fail: bool) -> Result<Action> {
        if fail {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "action log unavailable".to_string(),
            )));
        }
        self.next_action += 1;
        let action = Action {
            id: format!("action-{}", self.next_action),
            action_type: new_action.action_type,
            timestamp: new_action.timestamp,
            derivative_id: new_action.derivative_id,
            user_id: new_action.user_id,
            update_log: new_action.update_log,
        };
        self.actions.push(action.clone());
        Ok(action)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    fail_appends: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A unit of work that writes straight into the store, without rollback.
    pub fn uow(&self) -> DirectUnitOfWork<'_> {
        DirectUnitOfWork {
            state: self.state.lock().unwrap(),
            fail_appends: self.fail_appends.load(Ordering::SeqCst),
        }
    }

    /// Inserts a derivative without recording an action.
    pub fn seed_derivative(&self, new_derivative: NewDerivative) -> Derivative {
        self.state.lock().unwrap().insert_derivative(new_derivative)
    }

    /// Makes every subsequent action append fail.
    pub fn fail_action_appends(&self) {
        self.fail_appends.store(true, Ordering::SeqCst);
    }

    pub fn derivative(&self, derivative_id: &str) -> Option<Derivative> {
        self.state.lock().unwrap().find_derivative(derivative_id)
    }

    pub fn derivative_count(&self) -> usize {
        self.state.lock().unwrap().derivatives.len()
    }

    pub fn actions(&self, filter: &ActionFilter) -> Vec<Action> {
        self.state
            .lock()
            .unwrap()
            .actions
            .iter()
            .rev()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect()
    }

    pub fn action_count(&self) -> usize {
        self.state.lock().unwrap().actions.len()
    }
}

pub struct DirectUnitOfWork<'a> {
    state: MutexGuard<'a, StoreState>,
    fail_appends: bool,
}

impl UnitOfWork for DirectUnitOfWork<'_> {
    fn find_derivative(&mut self, derivative_id: &str) -> Result<Option<Derivative>> {
        Ok(self.state.find_derivative(derivative_id))
    }

    fn insert_derivative(&mut self, new_derivative: NewDerivative) -> Result<Derivative> {
        Ok(self.state.insert_derivative(new_derivative))
    }

    fn save_derivative(&mut self, derivative: &Derivative) -> Result<()> {
        self.state.save_derivative(derivative)
    }

    fn append_action(&mut self, new_action: NewAction) -> Result<Action> {
        self.state.append_action(new_action, self.fail_appends)
    }
}

struct StagedUnitOfWork {
    state: StoreState,
    fail_appends: bool,
}

impl UnitOfWork for StagedUnitOfWork {
    fn find_derivative(&mut self, derivative_id: &str) -> Result<Option<Derivative>> {
        Ok(self.state.find_derivative(derivative_id))
    }

    fn insert_derivative(&mut self, new_derivative: NewDerivative) -> Result<Derivative> {
        Ok(self.state.insert_derivative(new_derivative))
    }

    fn save_derivative(&mut self, derivative: &Derivative) -> Result<()> {
        self.state.save_derivative(derivative)
    }

    fn append_action(&mut self, new_action: NewAction) -> Result<Action> {
        self.state.append_action(new_action, self.fail_appends)
    }
}

#[async_trait]
impl UnitOfWorkExecutor for InMemoryStore {
    async fn execute<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut staged = StagedUnitOfWork {
            state: self.state.lock().unwrap().clone(),
            fail_appends: self.fail_appends.load(Ordering::SeqCst),
        };
        let result = job(&mut staged)?;
        *self.state.lock().unwrap() = staged.state;
        Ok(result)
    }
}

impl DerivativeRepositoryTrait for InMemoryStore {
    fn get_by_id(&self, derivative_id: &str) -> Result<Option<Derivative>> {
        Ok(self.derivative(derivative_id))
    }

    fn list(&self, filter: &DerivativeFilter) -> Result<Vec<Derivative>> {
        let mut derivatives: Vec<Derivative> = self
            .state
            .lock()
            .unwrap()
            .derivatives
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        derivatives.sort_by(|a, b| {
            a.date_of_trade
                .cmp(&b.date_of_trade)
                .then_with(|| a.code.cmp(&b.code))
        });
        Ok(derivatives)
    }
}

impl ActionRepositoryTrait for InMemoryStore {
    fn get_by_id(&self, action_id: &str) -> Result<Option<Action>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .actions
            .iter()
            .find(|a| a.id == action_id)
            .cloned())
    }

    fn list(&self, filter: &ActionFilter) -> Result<Vec<Action>> {
        Ok(self.actions(filter))
    }
}
