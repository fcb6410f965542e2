//! Handlers for the `/user` resource.
//!
//! `login` and `refresh` are open; `signup`, `list` and `delete` require
//! [`AdminUser`]; `passchange` requires [`CurrentUser`].

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::State;
use axum::{Form, Json};
use serde::Deserialize;
use userauth_core::error::CoreError;
use userauth_core::types::DbId;
use userauth_db::models::user::UserSummary;

use crate::error::AppResult;
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::AdminUser;
use crate::response::MessageResponse;
use crate::service::account::{
    LoginResponse, PasswordChangeRequest, RefreshResponse, SignupRequest, SignupResponse,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Form body for `POST /user/login` (OAuth2 password form).
///
/// `username` may hold either the username or the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /user/refresh`.
///
/// A missing token is an invalid token, not a malformed request.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Request body for `DELETE /user/delete`.
#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub id: DbId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /user/signup
pub async fn signup(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<Json<SignupResponse>> {
    let Json(input) = body?;
    tracing::debug!(admin_id = admin.id, "Signup requested");
    let created = state.accounts.signup(input).await?;
    Ok(Json(created))
}

/// POST /user/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Form<LoginForm>, FormRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Form(form) = body?;
    let tokens = state.accounts.login(&form.username, &form.password).await?;
    Ok(Json(tokens))
}

/// POST /user/refresh
pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<RefreshResponse>> {
    let Json(input) = body?;
    let token = input.refresh_token.ok_or(CoreError::InvalidToken)?;
    let refreshed = state.accounts.refresh(&token).await?;
    Ok(Json(refreshed))
}

/// GET /user/list
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.accounts.list_users().await?))
}

/// DELETE /user/delete
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    body: Result<Json<DeleteUserRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(input) = body?;
    state.accounts.delete_user(input.id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// PUT /user/passchange
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<PasswordChangeRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(input) = body?;
    state.accounts.change_password(&user, input).await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}
