//! # User Repository
//!
//! Accounts under `syspharma_users`.
//!
//! Email is unique, compared case-insensitively. The check runs against the
//! array loaded for the write, so two tabs registering the same email at the
//! same moment can both succeed.

use syspharma_core::User;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::repository::Collection;
use crate::storage::LocalStorage;

#[derive(Debug, Clone)]
pub struct UserRepository {
    users: Collection<User>,
}

impl UserRepository {
    pub fn new(storage: LocalStorage) -> Self {
        UserRepository {
            users: Collection::new(storage),
        }
    }

    pub async fn list(&self) -> StoreResult<Vec<User>> {
        self.users.load().await
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        self.users.get_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.list().await?.into_iter().find(|u| u.has_email(email)))
    }

    /// Appends a new user.
    ///
    /// ## Errors
    /// * `StoreError::UniqueViolation` - Email already registered; nothing written
    pub async fn insert(&self, user: User) -> StoreResult<User> {
        debug!(email = %user.email, role = %user.role, "Inserting user");

        let users = self.list().await?;
        if users.iter().any(|u| u.has_email(&user.email)) {
            warn!(email = %user.email, "Rejected duplicate email");
            return Err(StoreError::duplicate("email", user.email.trim()));
        }

        self.users.append(user).await
    }

    /// Replaces a user by id. Email must not belong to any other user.
    pub async fn update(&self, user: &User) -> StoreResult<()> {
        debug!(id = %user.id, "Updating user");

        let users = self.list().await?;
        if users
            .iter()
            .any(|u| u.id != user.id && u.has_email(&user.email))
        {
            warn!(email = %user.email, "Rejected duplicate email on edit");
            return Err(StoreError::duplicate("email", user.email.trim()));
        }

        self.users.replace(user).await
    }

    /// Removes exactly one user. Every other record stays byte-identical.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deleting user");
        self.users.remove(id).await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        self.users.count().await
    }
}
