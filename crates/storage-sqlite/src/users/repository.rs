use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use log::info;
use std::sync::Arc;

use derivatex_core::errors::Result;
use derivatex_core::users::{NewUser, User, UserRepositoryTrait};

use super::model::UserDB;
use crate::actions::format_timestamp;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::users;
use crate::schema::users::dsl::*;

/// Repository for the users that actions are attributed to.
pub struct UserRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    fn get_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;

        let user = users
            .select(UserDB::as_select())
            .find(user_id)
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(user.map(User::from))
    }

    fn get_by_email(&self, wanted_email: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;

        let user = users
            .select(UserDB::as_select())
            .filter(email.eq(wanted_email))
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(user.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        new_user.validate()?;

        self.writer
            .exec(move |conn| {
                let user_db = UserDB::from_new(
                    uuid::Uuid::new_v4().to_string(),
                    new_user,
                    &format_timestamp(Utc::now()),
                );

                diesel::insert_into(users::table)
                    .values(&user_db)
                    .execute(conn)
                    .into_core()?;

                info!("Registered user {}", user_db.id);
                Ok(user_db.into())
            })
            .await
    }
}
