//! Bearer-token guard resolving the current user.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use userauth_core::error::CoreError;
use userauth_db::models::user::User;

use crate::error::AppResult;
use crate::state::AppState;

/// The authenticated user, loaded from the store on every request.
///
/// Use this as an extractor parameter in any handler that requires authentication:
///
/// ```ignore
/// async fn my_handler(CurrentUser(user): CurrentUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Pull the token out of an `Authorization` header value.
///
/// The scheme is matched case-insensitively. A missing header, another
/// scheme, or an empty token all count as no token.
pub fn bearer_token(header: Option<&str>) -> Result<&str, CoreError> {
    let header = header.ok_or(CoreError::MissingToken)?;
    let (scheme, token) = header.split_once(' ').ok_or(CoreError::MissingToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(CoreError::MissingToken);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(CoreError::MissingToken);
    }
    Ok(token)
}

/// Resolve the user behind an `Authorization` header value.
///
/// The token's claims are only used to find the user; the returned record
/// (including its role) is whatever the store holds now. A token whose user
/// has been deleted is reported as [`CoreError::InvalidToken`].
pub async fn resolve_current_user(
    state: &AppState,
    authorization: Option<&str>,
) -> AppResult<User> {
    let token = bearer_token(authorization)?;
    let claims = state.tokens.decode(token)?;

    let user = state
        .store
        .find_by_id(claims.id)
        .await?
        .ok_or(CoreError::InvalidToken)?;
    Ok(user)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = crate::error::AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let user = resolve_current_user(state, header).await?;
        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(Some("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn missing_or_empty_token_is_missing() {
        assert_matches!(bearer_token(None), Err(CoreError::MissingToken));
        assert_matches!(bearer_token(Some("")), Err(CoreError::MissingToken));
        assert_matches!(bearer_token(Some("Bearer")), Err(CoreError::MissingToken));
        assert_matches!(bearer_token(Some("Bearer   ")), Err(CoreError::MissingToken));
        assert_matches!(bearer_token(Some("Basic dXNlcjpwdw==")), Err(CoreError::MissingToken));
    }
}
