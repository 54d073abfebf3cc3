//! Diesel-backed unit of work.
//!
//! A `SqliteUnitOfWork` borrows the writer actor's connection for the duration
//! of one job. The actor has already opened an immediate transaction, so
//! everything written here commits or rolls back together.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use derivatex_core::actions::{Action, NewAction};
use derivatex_core::derivatives::{Derivative, NewDerivative};
use derivatex_core::errors::{DatabaseError, Error, Result};
use derivatex_core::unit_of_work::{UnitOfWork, UnitOfWorkExecutor};

use super::write_actor::WriteHandle;
use crate::actions::ActionDB;
use crate::derivatives::{DerivativeChangesetDB, DerivativeDB};
use crate::errors::IntoCore;
use crate::schema::{actions, derivatives};

pub struct SqliteUnitOfWork<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> SqliteUnitOfWork<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }
}

fn now_text() -> String {
    crate::actions::format_timestamp(Utc::now())
}

impl UnitOfWork for SqliteUnitOfWork<'_> {
    fn find_derivative(&mut self, derivative_id: &str) -> Result<Option<Derivative>> {
        derivatives::table
            .select(DerivativeDB::as_select())
            .find(derivative_id)
            .first::<DerivativeDB>(&mut *self.conn)
            .optional()
            .into_core()?
            .map(Derivative::try_from)
            .transpose()
    }

    fn insert_derivative(&mut self, new_derivative: NewDerivative) -> Result<Derivative> {
        let derivative_db =
            DerivativeDB::from_new(Uuid::new_v4().to_string(), new_derivative, &now_text());

        let inserted = diesel::insert_into(derivatives::table)
            .values(&derivative_db)
            .returning(DerivativeDB::as_returning())
            .get_result::<DerivativeDB>(&mut *self.conn)
            .into_core()?;

        inserted.try_into()
    }

    fn save_derivative(&mut self, derivative: &Derivative) -> Result<()> {
        let changeset = DerivativeChangesetDB::from_domain(derivative, &now_text());

        let affected = diesel::update(derivatives::table.find(&derivative.id))
            .set(&changeset)
            .execute(&mut *self.conn)
            .into_core()?;

        if affected == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Derivative {}",
                derivative.id
            ))));
        }
        Ok(())
    }

    fn append_action(&mut self, new_action: NewAction) -> Result<Action> {
        let action_db = ActionDB::from_new(Uuid::now_v7().to_string(), new_action)?;

        diesel::insert_into(actions::table)
            .values(&action_db)
            .execute(&mut *self.conn)
            .into_core()?;

        action_db.try_into()
    }
}

#[async_trait]
impl UnitOfWorkExecutor for WriteHandle {
    async fn execute<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.exec(move |conn| job(&mut SqliteUnitOfWork::new(conn)))
            .await
    }
}
