//! Shared application state and the health probe.

use axum::{http::StatusCode, Json};
use serde_json::json;

use std::sync::Arc;

use crate::auth::{AuthFlow, CookieSettings, Passwords, SessionTokens, BCRYPT_COST};
use crate::config::Config;
use crate::db::UserStore;
use crate::error::AppResult;

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthFlow,
    pub cookie: CookieSettings,
    /// Register failures answer 200 with an `error` body.
    pub legacy_error_status: bool,
}

impl AppState {
    /// Wire the auth flow, cookie settings and status mode from configuration.
    pub fn new(config: &Config, store: Arc<dyn UserStore>) -> AppResult<Self> {
        let passwords = Passwords::new(BCRYPT_COST)?;
        let tokens = SessionTokens::new(&config.jwt_secret, config.jwt_expires_in);
        Ok(Self {
            auth: AuthFlow::new(store, passwords, tokens),
            cookie: CookieSettings {
                expires_days: config.jwt_cookie_expires_days,
                secure: config.cookie_secure,
            },
            legacy_error_status: config.legacy_error_status,
        })
    }

    pub fn auth(&self) -> &AuthFlow {
        &self.auth
    }
    pub fn cookie_settings(&self) -> &CookieSettings {
        &self.cookie
    }
}

/// GET /health: liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "authd" })),
    )
}
