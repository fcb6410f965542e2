/// Domain error taxonomy for authentication and account management.
///
/// Each variant maps to exactly one HTTP status in the API layer. Messages are
/// deliberately generic: they are safe to return to clients verbatim.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No bearer token was presented.
    #[error("Missing token.")]
    MissingToken,

    /// Bad signature, malformed token, or the token's user no longer exists.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    /// Unknown identifier or wrong password. The two are never distinguished.
    #[error("Invalid email/username or password")]
    InvalidCredentials,

    /// Insufficient role or ownership.
    #[error("Not enough permissions")]
    Forbidden,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Invalid role")]
    InvalidRole,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
