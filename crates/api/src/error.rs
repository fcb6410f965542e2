use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use userauth_core::error::CoreError;
use userauth_db::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds infrastructure failures.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `userauth_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AppError::Core(CoreError::DuplicateEmail),
            StoreError::DuplicateUsername => AppError::Core(CoreError::DuplicateUsername),
            StoreError::Database(e) => AppError::Database(e),
            other @ StoreError::InvalidTableName(_) => AppError::InternalError(other.to_string()),
        }
    }
}

// Malformed or incomplete request bodies render in the usual error shape.

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Core(CoreError::Validation(rejection.body_text()))
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Core(CoreError::Validation(rejection.body_text()))
    }
}

impl AppError {
    /// The HTTP status this error renders with.
    pub fn status(&self) -> StatusCode {
        self.parts().0
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            // --- CoreError variants ---
            AppError::Core(core) => {
                let (status, code) = match core {
                    CoreError::MissingToken => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
                    CoreError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
                    CoreError::ExpiredToken => (StatusCode::UNAUTHORIZED, "EXPIRED_TOKEN"),
                    CoreError::InvalidCredentials => {
                        (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
                    }
                    CoreError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                    CoreError::DuplicateEmail => (StatusCode::BAD_REQUEST, "DUPLICATE_EMAIL"),
                    CoreError::DuplicateUsername => {
                        (StatusCode::BAD_REQUEST, "DUPLICATE_USERNAME")
                    }
                    CoreError::InvalidRole => (StatusCode::BAD_REQUEST, "INVALID_ROLE"),
                    CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    CoreError::UserNotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    CoreError::Internal(_) => return internal(),
                };
                (status, code, core.to_string())
            }

            // --- Database errors ---
            AppError::Database(_) => internal(),

            // --- HTTP-specific errors ---
            AppError::InternalError(_) => internal(),
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // The detail stays in the logs; clients only see the generic message.
            tracing::error!(error = %self, "Request failed with internal error");
        }

        let body = json!({
            "error": message,
            "code": code,
        });

        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_401() {
        for err in [
            CoreError::MissingToken,
            CoreError::InvalidToken,
            CoreError::ExpiredToken,
            CoreError::InvalidCredentials,
        ] {
            assert_eq!(AppError::from(err).status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn client_errors_map_to_expected_statuses() {
        assert_eq!(AppError::from(CoreError::Forbidden).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::from(CoreError::InvalidRole).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(CoreError::UserNotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(StoreError::DuplicateEmail).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(StoreError::DuplicateUsername).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::InternalError("connection refused on 10.0.0.3".into());
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
        assert!(!message.contains("10.0.0.3"));
    }

    #[test]
    fn unauthorized_responses_carry_bearer_challenge() {
        let response = AppError::from(CoreError::MissingToken).into_response();
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");

        let response = AppError::from(CoreError::Forbidden).into_response();
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }
}
