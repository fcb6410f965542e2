use axum::routing::get;
use axum::Router;

use crate::handlers::demo;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(demo::unprotected))
        .route("/protected", get(demo::protected))
        .route("/superprotected", get(demo::superprotected))
}
