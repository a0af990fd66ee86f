//! Auth HTTP handlers: register, login.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::handlers::http::AppState;

pub const MISSING_CREDENTIALS: &str = "Please provide an email and password";

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: u16,
    pub message: &'static str,
    pub id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: u16,
    pub message: &'static str,
}

/// Both fields present and non-empty, or a validation error.
fn credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String), AppError> {
    match (email, password) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(AppError::Validation(MISSING_CREDENTIALS.to_string())),
    }
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;
    body.validate()
        .map_err(|_| AppError::Validation(MISSING_CREDENTIALS.to_string()))?;
    let (email, password) = credentials(body.email, body.password)?;

    let outcome = state.auth().login(&email, &password).await?;

    let cookie = state
        .cookie_settings()
        .session_cookie(&outcome.token, Utc::now())?;

    let body = LoginResponse {
        status: StatusCode::OK.as_u16(),
        message: "User Login",
        id: outcome.id,
        token: outcome.token,
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    match register_user(&state, payload).await {
        Ok(()) => Json(RegisterResponse {
            status: StatusCode::OK.as_u16(),
            message: "User registered",
        })
        .into_response(),
        Err(e @ (AppError::Conflict(_) | AppError::Validation(_))) if state.legacy_error_status => {
            e.into_response_with_status(StatusCode::OK)
        }
        Err(e) => e.into_response(),
    }
}

async fn register_user(
    state: &AppState,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(), AppError> {
    let Json(body) = payload?;
    body.validate()
        .map_err(|_| AppError::Validation(MISSING_CREDENTIALS.to_string()))?;
    let (email, password) = credentials(body.email, body.password)?;
    state
        .auth()
        .register(&email, &password, body.password_confirm.as_deref())
        .await?;
    Ok(())
}
