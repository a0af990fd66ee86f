//! In-process user store with the same uniqueness rule as the `users` table.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{UserRow, UserStore};
use crate::error::{AppError, AppResult};

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, UserRow>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRow>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> AppResult<Uuid> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(AppError::ConstraintViolation(
                "duplicate key value violates unique constraint \"users_email_key\"".to_string(),
            ));
        }
        let id = Uuid::new_v4();
        users.insert(
            email.to_string(),
            UserRow {
                id,
                email: email.to_string(),
                password: password_hash.to_string(),
                created_at,
                updated_at: None,
            },
        );
        Ok(id)
    }

    async fn touch_last_login(&self, email: &str, at: DateTime<Utc>) -> AppResult<()> {
        if let Some(user) = self.users.write().await.get_mut(email) {
            user.updated_at = Some(at);
        }
        Ok(())
    }
}
