//! Session cookie construction.

use axum::http::HeaderValue;
use chrono::{DateTime, Duration, Utc};

use crate::error::{AppError, AppResult};

pub const SESSION_COOKIE_NAME: &str = "jwt";

#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub expires_days: i64,
    /// Only mark cookies secure when the frontend is served over HTTPS.
    pub secure: bool,
}

impl CookieSettings {
    fn lifetime(&self) -> AppResult<Duration> {
        Duration::try_days(self.expires_days)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cookie lifetime out of range")))
    }

    pub fn expires_at(&self, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        now.checked_add_signed(self.lifetime()?)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cookie expiry out of range")))
    }

    /// Build the `HttpOnly` cookie carrying the session token.
    pub fn session_cookie(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<HeaderValue> {
        let expires = self.expires_at(now)?.format("%a, %d %b %Y %H:%M:%S GMT");
        let max_age = self.lifetime()?.num_seconds();
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={token}; Path=/; Expires={expires}; Max-Age={max_age}; HttpOnly; SameSite=Lax"
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("session cookie: {}", e)))
    }
}
