use async_trait::async_trait;

use super::users_model::{NewUser, User};
use crate::errors::Result;

/// Trait defining the contract for User repository operations.
///
/// The lifecycle manager only resolves users; creation exists for
/// bootstrapping attribution targets.
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Retrieves a user by ID, or `None` if no such user exists.
    fn get_by_id(&self, user_id: &str) -> Result<Option<User>>;

    /// Retrieves a user by email address.
    fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Registers a new user. Emails are unique.
    async fn create(&self, new_user: NewUser) -> Result<User>;
}
