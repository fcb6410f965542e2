pub mod demo;
pub mod health;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree.
///
/// ```text
/// /health                  health check (public)
///
/// /                        sample, unprotected
/// /protected               sample, requires a valid token
/// /superprotected          sample, requires an admin token
///
/// /user/signup             POST   (admin)
/// /user/login              POST   (public, form body)
/// /user/refresh            POST   (public)
/// /user/list               GET    (admin)
/// /user/delete             DELETE (admin)
/// /user/passchange         PUT    (current user)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(demo::router())
        .nest("/user", user::router())
}
