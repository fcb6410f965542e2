//! The user store capability.

use async_trait::async_trait;
use userauth_core::types::DbId;

use crate::error::StoreError;
use crate::models::user::{NewUser, User};

/// CRUD over user records.
///
/// Implementations must enforce email and username uniqueness atomically on
/// [`insert`](UserStore::insert): of two concurrent inserts sharing a value,
/// exactly one succeeds and the other returns
/// [`StoreError::DuplicateEmail`] or [`StoreError::DuplicateUsername`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Find the user whose email or username equals `identifier`.
    ///
    /// An email match wins if the identifier matches one user's email and a
    /// different user's username.
    async fn find_by_email_or_username(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError>;

    /// All users in ascending id order.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Insert a new user, returning the stored row.
    async fn insert(&self, input: &NewUser) -> Result<User, StoreError>;

    /// Replace a user's password hash. Returns `false` if no such user exists.
    async fn update_password(&self, id: DbId, password_hash: &str) -> Result<bool, StoreError>;

    /// Delete a user. Returns `false` if no such user exists.
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;

    /// Confirm the backing store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}
