//! Role-based access control guard.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use userauth_core::error::CoreError;
use userauth_db::models::user::User;

use super::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(AdminUser(user): AdminUser) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

/// Accept `user` only if it holds the admin role.
pub fn require_admin(user: User) -> Result<User, CoreError> {
    if !user.role.is_admin() {
        return Err(CoreError::Forbidden);
    }
    Ok(user)
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(AdminUser(require_admin(user)?))
    }
}
