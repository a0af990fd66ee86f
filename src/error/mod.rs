//! Application error types and their HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned for every failed credential check, whatever the cause.
pub const BAD_CREDENTIALS: &str = "Email or Password is incorrect";
/// Message returned when an email is already registered.
pub const EMAIL_IN_USE: &str = "That email is already in use";

const INTERNAL: &str = "Internal server error";

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed")]
    Authentication,

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A storage-level uniqueness constraint rejected a write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database error: {0}")]
    Datastore(#[from] sqlx::Error),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication | AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) | AppError::ConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::Datastore(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Storage and internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::Conflict(msg) | AppError::Token(msg) => {
                msg.clone()
            }
            AppError::Authentication => BAD_CREDENTIALS.to_string(),
            AppError::ConstraintViolation(_) => EMAIL_IN_USE.to_string(),
            AppError::Datastore(_) | AppError::Internal(_) => INTERNAL.to_string(),
        }
    }

    /// Render with an explicit status instead of the conventional one.
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(json!({ "error": { "message": self.public_message() } }));
        (status, body).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        self.into_response_with_status(status)
    }
}

/// Unreadable request bodies are client errors and use the same `error` envelope.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;
