//! Startup bootstrap: make sure an administrator exists.

use userauth_core::error::CoreError;
use userauth_core::roles::Role;
use userauth_core::validation::validate_input;

use crate::config::AdminBootstrap;
use crate::error::{AppError, AppResult};
use crate::service::account::SignupRequest;
use crate::state::AppState;

/// Create the configured administrator unless a user with that email exists.
///
/// Returns `true` if a user was created. Safe to run on every start and from
/// several instances at once: losing the insert race counts as "exists".
///
/// The credentials go through the same checks as a signup.
pub async fn bootstrap_admin(state: &AppState, admin: &AdminBootstrap) -> AppResult<bool> {
    validate_input(&SignupRequest {
        email: admin.email.clone(),
        username: admin.username.clone(),
        password: admin.password.clone(),
        role: None,
    })?;

    if state.store.find_by_email(&admin.email).await?.is_some() {
        tracing::debug!(email = %admin.email, "Bootstrap admin already present");
        return Ok(false);
    }

    match state
        .accounts
        .create_user(&admin.email, &admin.username, &admin.password, Role::Admin)
        .await
    {
        Ok(user) => {
            tracing::info!(
                user_id = user.id,
                username = %user.username,
                email = %user.email,
                "Bootstrap admin created"
            );
            Ok(true)
        }
        Err(AppError::Core(CoreError::DuplicateEmail)) => Ok(false),
        Err(e) => Err(e),
    }
}
