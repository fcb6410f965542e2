//! Sample endpoints showing each guard level.

use axum::Json;

use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::AdminUser;
use crate::response::MessageResponse;

/// GET /
pub async fn unprotected() -> Json<MessageResponse> {
    Json(MessageResponse::new("This is an unprotected route"))
}

/// GET /protected
pub async fn protected(CurrentUser(_user): CurrentUser) -> Json<MessageResponse> {
    Json(MessageResponse::new(
        "You have access to this JWT protected resource.",
    ))
}

/// GET /superprotected
pub async fn superprotected(AdminUser(_admin): AdminUser) -> Json<MessageResponse> {
    Json(MessageResponse::new(
        "You have access to this ADMIN protected resource.",
    ))
}
