//! Login and registration flow over a [`UserStore`].

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::jwt::SessionTokens;
use super::password::Passwords;
use crate::db::UserStore;
use crate::error::{AppError, AppResult, EMAIL_IN_USE};

pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

/// Successful login: the user and the session token issued for them.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub id: Uuid,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthFlow {
    store: Arc<dyn UserStore>,
    passwords: Passwords,
    tokens: SessionTokens,
}

impl AuthFlow {
    pub fn new(store: Arc<dyn UserStore>, passwords: Passwords, tokens: SessionTokens) -> Self {
        Self {
            store,
            passwords,
            tokens,
        }
    }

    pub fn tokens(&self) -> &SessionTokens {
        &self.tokens
    }

    /// Check credentials, issue a token and record the login time.
    ///
    /// Unknown email and wrong password both yield [`AppError::Authentication`].
    /// The `updated_at` write is awaited but its failure is only logged.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let user = self.store.find_by_email(email).await?;

        let stored = user.as_ref().map(|u| u.password.clone());
        let matched = match self.passwords.verify_blocking(password.to_string(), stored).await {
            Ok(matched) => matched,
            Err(e) => {
                error!(error = %e, email = %email, "stored password hash unusable");
                false
            }
        };

        let user = match user {
            Some(user) if matched => user,
            _ => {
                warn!(email = %email, "login rejected");
                return Err(AppError::Authentication);
            }
        };

        let token = self.tokens.issue(user.id)?;

        if let Err(e) = self.store.touch_last_login(&user.email, Utc::now()).await {
            warn!(error = %e, user_id = %user.id, "failed to update last login");
        }

        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome { id: user.id, token })
    }

    /// Create a user. An existing email wins over a password mismatch.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        password_confirm: Option<&str>,
    ) -> AppResult<Uuid> {
        if self.store.find_by_email(email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AppError::Conflict(EMAIL_IN_USE.to_string()));
        }

        if password_confirm != Some(password) {
            return Err(AppError::Validation(PASSWORDS_DO_NOT_MATCH.to_string()));
        }

        let hash = self.passwords.hash_blocking(password.to_string()).await?;

        match self.store.insert_user(email, &hash, Utc::now()).await {
            Ok(id) => {
                info!(user_id = %id, email = %email, "user registered");
                Ok(id)
            }
            Err(AppError::ConstraintViolation(detail)) => {
                warn!(email = %email, detail = %detail, "registration lost uniqueness race");
                Err(AppError::Conflict(EMAIL_IN_USE.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}
