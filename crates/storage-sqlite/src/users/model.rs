//! Database model for users.

use diesel::prelude::*;

use derivatex_core::users::{NewUser, User};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl UserDB {
    pub fn from_new(id: String, domain: NewUser, now: &str) -> Self {
        Self {
            id,
            first_name: domain.first_name,
            last_name: domain.last_name,
            email: domain.email,
            password_hash: domain.password_hash,
            created_at: now.to_string(),
        }
    }
}

impl From<UserDB> for User {
    fn from(db: UserDB) -> Self {
        Self {
            id: db.id,
            first_name: db.first_name,
            last_name: db.last_name,
            email: db.email,
            password_hash: db.password_hash,
        }
    }
}
