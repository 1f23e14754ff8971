//! Credential store
//!
//! `UserStore` is the seam between the authentication service and wherever
//! users live. `InMemoryUserStore` keeps them for the lifetime of the
//! process; a persistent backend only needs to implement the trait.

use crate::{AuthError, NewUser, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists")]
    UsernameTaken,

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UsernameTaken => AuthError::Conflict,
            StoreError::Backend(msg) => AuthError::Internal(msg),
        }
    }
}

/// Registry of users keyed by username
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look a user up by exact (case-sensitive) username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user, assigning the next sequential id
    ///
    /// The uniqueness check and the insertion happen atomically: of two
    /// concurrent inserts with the same username exactly one succeeds, the
    /// other gets [`StoreError::UsernameTaken`] and nothing is written.
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// The id the next successful insert will receive
    async fn next_id(&self) -> Result<String, StoreError>;

    /// Number of registered users
    async fn count(&self) -> Result<usize, StoreError>;
}

#[derive(Default)]
struct Registry {
    users: Vec<User>,
    by_username: HashMap<String, usize>,
}

/// Process-local user registry
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Registry>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let registry = self.inner.read().await;
        Ok(registry
            .by_username
            .get(username)
            .map(|&idx| registry.users[idx].clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let registry = self.inner.read().await;
        Ok(registry.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut registry = self.inner.write().await;

        if registry.by_username.contains_key(&new_user.username) {
            return Err(StoreError::UsernameTaken);
        }

        // Users are never removed, so the position doubles as the id counter
        let idx = registry.users.len();
        let user = User {
            id: (idx + 1).to_string(),
            username: new_user.username,
            name: new_user.name,
            password: new_user.password_hash,
            picture: new_user.picture,
            created_at: Utc::now(),
        };

        registry.by_username.insert(user.username.clone(), idx);
        registry.users.push(user.clone());

        tracing::debug!(user_id = %user.id, username = %user.username, "user stored");
        Ok(user)
    }

    async fn next_id(&self) -> Result<String, StoreError> {
        Ok((self.inner.read().await.users.len() + 1).to_string())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().await.users.len())
    }
}
