//! Password hashing and verification.

use std::sync::Arc;

use tracing::error;

use crate::error::{AppError, AppResult};

/// bcrypt work factor for newly registered passwords.
pub const BCRYPT_COST: u32 = 8;

/// Hashes and verifies passwords with bcrypt.
#[derive(Clone)]
pub struct Passwords {
    cost: u32,
    /// Compared against when no user exists, so both failure paths do the same work.
    dummy_hash: Arc<str>,
}

impl Passwords {
    pub fn new(cost: u32) -> AppResult<Self> {
        let dummy_hash = bcrypt::hash("authd-timing-equalizer", cost)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash: {}", e)))?;
        Ok(Self {
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn hash(&self, password: &str) -> AppResult<String> {
        bcrypt::hash(password, self.cost).map_err(|e| {
            error!(error = %e, "bcrypt hash error");
            AppError::Internal(anyhow::anyhow!("hash: {}", e))
        })
    }

    pub fn verify(&self, password: &str, hash: &str) -> AppResult<bool> {
        bcrypt::verify(password, hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("verify: {}", e)))
    }

    /// Burn one verification against the dummy hash. Always reports no match.
    pub fn verify_absent(&self, password: &str) -> bool {
        let _ = bcrypt::verify(password, &self.dummy_hash);
        false
    }

    /// [`Passwords::hash`] on the blocking pool.
    pub async fn hash_blocking(&self, password: String) -> AppResult<String> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.hash(&password))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash task: {}", e)))?
    }

    /// Verify on the blocking pool; `None` for the stored hash means the user was not found.
    pub async fn verify_blocking(&self, password: String, hash: Option<String>) -> AppResult<bool> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => this.verify(&password, &hash),
            None => Ok(this.verify_absent(&password)),
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("verify task: {}", e)))?
    }
}
