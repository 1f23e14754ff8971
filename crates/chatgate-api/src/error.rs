//! API error handling
//!
//! Errors are answered with a plain-text body carrying the message, which is
//! what the sign-up form displays verbatim.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chatgate_core::AuthError;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Unauthorized(msg) => {
                msg
            }
            AppError::Internal(details) => {
                tracing::error!(%details, "request failed");
                "Internal server error".to_string()
            }
        };

        (status, message).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(_)
            | AuthError::Mismatch
            | AuthError::Conflict
            | AuthError::InvalidCredentials => AppError::BadRequest(err.to_string()),
            AuthError::NotFound => AppError::NotFound(err.to_string()),
            AuthError::InvalidToken(_) => AppError::Unauthorized(err.to_string()),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Malformed, mistyped or non-JSON request bodies are client errors like any
/// other validation failure
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
