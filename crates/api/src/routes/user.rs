//! Route definitions for the `/user` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/user`.
///
/// ```text
/// POST   /signup      -> signup          (admin)
/// POST   /login       -> login
/// POST   /refresh     -> refresh
/// GET    /list        -> list_users      (admin)
/// DELETE /delete      -> delete_user     (admin)
/// PUT    /passchange  -> change_password (current user)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(user::signup))
        .route("/login", post(user::login))
        .route("/refresh", post(user::refresh))
        .route("/list", get(user::list_users))
        .route("/delete", delete(user::delete_user))
        .route("/passchange", put(user::change_password))
}
