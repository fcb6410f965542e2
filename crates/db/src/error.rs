/// Errors surfaced by [`UserStore`](crate::store::UserStore) implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The email is already held by another user (unique constraint).
    #[error("Email already registered")]
    DuplicateEmail,

    /// The username is already held by another user (unique constraint).
    #[error("Username already taken")]
    DuplicateUsername,

    /// The configured table name is not a plain SQL identifier.
    #[error("Invalid user table name: {0:?}")]
    InvalidTableName(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
