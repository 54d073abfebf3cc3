use diesel::prelude::*;
use std::sync::Arc;

use derivatex_core::actions::{Action, ActionFilter, ActionRepositoryTrait};
use derivatex_core::errors::Result;

use super::model::ActionDB;
use crate::db::{get_connection, DbPool};
use crate::errors::IntoCore;
use crate::schema::actions;
use crate::schema::actions::dsl::*;

/// Read side of the action log. Appends happen in `SqliteUnitOfWork`.
pub struct ActionRepository {
    pool: Arc<DbPool>,
}

impl ActionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl ActionRepositoryTrait for ActionRepository {
    fn get_by_id(&self, action_id: &str) -> Result<Option<Action>> {
        let mut conn = get_connection(&self.pool)?;

        actions
            .select(ActionDB::as_select())
            .find(action_id)
            .first::<ActionDB>(&mut conn)
            .optional()
            .into_core()?
            .map(Action::try_from)
            .transpose()
    }

    fn list(&self, filter: &ActionFilter) -> Result<Vec<Action>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = actions::table.into_boxed();

        if let Some(ref wanted_derivative) = filter.derivative_id {
            query = query.filter(derivative_id.eq(wanted_derivative.clone()));
        }
        if let Some(ref wanted_user) = filter.user_id {
            query = query.filter(user_id.eq(wanted_user.clone()));
        }
        if let Some(wanted_type) = filter.action_type {
            query = query.filter(action_type.eq(wanted_type.as_str()));
        }

        let results = query
            .select(ActionDB::as_select())
            .order((timestamp.desc(), id.desc()))
            .load::<ActionDB>(&mut conn)
            .into_core()?;

        results.into_iter().map(Action::try_from).collect()
    }
}
