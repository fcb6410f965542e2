//! Signup, login, refresh, listing, deletion and password change.
//!
//! Guards are applied by the HTTP layer: `signup`, `list_users` and
//! `delete_user` are mounted behind the admin guard, `change_password` behind
//! the current-user guard, and `login` / `refresh` are open.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use userauth_core::error::CoreError;
use userauth_core::roles::Role;
use userauth_core::types::DbId;
use userauth_core::validation::validate_input;
use userauth_db::models::user::{NewUser, User, UserSummary};
use userauth_db::UserStore;
use validator::Validate;

use crate::auth::jwt::TokenService;
use crate::auth::password::{CredentialHasher, HashError};
use crate::error::{AppError, AppResult};

/// `token_type` reported alongside every issued access token.
pub const TOKEN_TYPE_BEARER: &str = "bearer";

// ---------------------------------------------------------------------------
// Inputs / outputs
// ---------------------------------------------------------------------------

/// Input for [`AccountService::signup`].
///
/// Length limits match the `username VARCHAR(30)` and `email VARCHAR(120)` columns.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email, length(max = 120))]
    pub email: String,
    #[validate(length(min = 1, max = 30))]
    pub username: String,
    #[validate(length(min = 1, max = 30))]
    pub password: String,
    /// Role name; `basic` when omitted.
    #[serde(default)]
    pub role: Option<String>,
}

/// Result of a successful signup. The password is never echoed.
#[derive(Debug, Clone, Serialize)]
pub struct SignupResponse {
    pub email: String,
    pub username: String,
    pub role: Role,
}

/// Input for [`AccountService::change_password`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordChangeRequest {
    #[validate(email, length(max = 120))]
    pub email: String,
    #[validate(length(min = 1, max = 30))]
    pub new_password: String,
}

/// Tokens issued by a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub role: Role,
}

/// A fresh access token issued from a refresh token.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Account management over an injected [`UserStore`].
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    hasher: CredentialHasher,
    tokens: Arc<TokenService>,
    /// Hash checked against when the login identifier matches nobody.
    dummy_hash: Arc<OnceCell<String>>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: CredentialHasher,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Register a new user. Admin only.
    pub async fn signup(&self, input: SignupRequest) -> AppResult<SignupResponse> {
        validate_input(&input)?;

        if self.store.find_by_email(&input.email).await?.is_some() {
            return Err(CoreError::DuplicateEmail.into());
        }
        if self.store.find_by_username(&input.username).await?.is_some() {
            return Err(CoreError::DuplicateUsername.into());
        }

        let role = match input.role.as_deref() {
            None => Role::default(),
            Some(name) => name.parse::<Role>()?,
        };

        // The store's uniqueness check is authoritative; the lookups above only
        // give the common case a clean error before paying for a hash.
        let user = self
            .create_user(&input.email, &input.username, &input.password, role)
            .await?;
        tracing::info!(user_id = user.id, role = %user.role, "User created");

        Ok(SignupResponse {
            email: user.email,
            username: user.username,
            role: user.role,
        })
    }

    /// Hash `password` and insert a user row.
    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password: &str,
        role: Role,
    ) -> AppResult<User> {
        let password_hash = self.hash_password(password.to_string()).await?;
        let input = NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role,
        };
        Ok(self.store.insert(&input).await?)
    }

    /// Authenticate by email or username and issue an access/refresh pair.
    ///
    /// An unknown identifier and a wrong password fail identically.
    pub async fn login(&self, identifier: &str, password: &str) -> AppResult<LoginResponse> {
        let Some(user) = self.store.find_by_email_or_username(identifier).await? else {
            // Same bcrypt work as a wrong password, so timing does not reveal the account.
            let dummy = self.dummy_hash().await?;
            self.verify_password(password.to_string(), dummy).await?;
            tracing::info!(identifier = %identifier, "Login failed");
            return Err(CoreError::InvalidCredentials.into());
        };

        if !self
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?
        {
            tracing::info!(identifier = %identifier, "Login failed");
            return Err(CoreError::InvalidCredentials.into());
        }

        let access_token = self.tokens.issue_access_token(
            &user.email,
            user.id,
            user.role,
            self.tokens.access_lifetime_mins(),
        )?;
        let refresh_token = self.tokens.issue_refresh_token(
            &user.email,
            user.id,
            self.tokens.refresh_lifetime_days(),
        )?;
        tracing::info!(user_id = user.id, "Login succeeded");

        Ok(LoginResponse {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER,
            role: user.role,
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The role is read from the stored user, not from the presented token, so
    /// role changes apply on the next refresh. The refresh token is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshResponse> {
        let claims = self.tokens.decode(refresh_token)?;

        let user = self
            .store
            .find_by_email(&claims.sub)
            .await?
            .ok_or(CoreError::InvalidToken)?;

        let access_token = self.tokens.issue_access_token(
            &user.email,
            user.id,
            user.role,
            self.tokens.access_lifetime_mins(),
        )?;
        tracing::debug!(user_id = user.id, "Access token refreshed");

        Ok(RefreshResponse {
            access_token,
            token_type: TOKEN_TYPE_BEARER,
        })
    }

    /// All users without password hashes. Admin only.
    pub async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        let users = self.store.list().await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }

    /// Delete a user by id. Admin only.
    pub async fn delete_user(&self, id: DbId) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(CoreError::UserNotFound.into());
        }
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Change a password. Admins may change anyone's; others only their own.
    pub async fn change_password(
        &self,
        actor: &User,
        input: PasswordChangeRequest,
    ) -> AppResult<()> {
        validate_input(&input)?;

        if !actor.role.is_admin() && actor.email != input.email {
            return Err(CoreError::Forbidden.into());
        }

        let target = self
            .store
            .find_by_email(&input.email)
            .await?
            .ok_or(CoreError::UserNotFound)?;

        let password_hash = self.hash_password(input.new_password).await?;
        if !self.store.update_password(target.id, &password_hash).await? {
            return Err(CoreError::UserNotFound.into());
        }
        tracing::info!(user_id = target.id, actor_id = actor.id, "Password changed");
        Ok(())
    }

    // bcrypt is deliberately slow, so it runs off the async worker threads.

    async fn hash_password(&self, password: String) -> AppResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::InternalError(format!("Hashing task failed: {e}")))?
            .map_err(|e| match e {
                HashError::TooLong { .. } => CoreError::Validation(e.to_string()).into(),
                HashError::Bcrypt(e) => {
                    AppError::InternalError(format!("Password hashing error: {e}"))
                }
            })
    }

    async fn dummy_hash(&self) -> AppResult<String> {
        self.dummy_hash
            .get_or_try_init(|| self.hash_password(String::new()))
            .await
            .cloned()
    }

    async fn verify_password(&self, password: String, stored_hash: String) -> AppResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| AppError::InternalError(format!("Verification task failed: {e}")))
    }
}
