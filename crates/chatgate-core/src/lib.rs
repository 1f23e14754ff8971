//! chatgate core - Domain models, validation and credential storage
//!
//! This crate defines the pieces of the authentication layer that do not
//! depend on HTTP:
//! - User models and the public projection handed to clients
//! - The authentication error taxonomy
//! - Input validation (field lengths, password policy)
//! - The credential store abstraction and its in-memory implementation
//! - Configuration management

pub mod config;
pub mod store;
pub mod validation;

pub use config::{
    AppConfig, AuthConfig, ConfigError, HasherConfig, LoggingConfig, ServerConfig,
};
pub use store::{InMemoryUserStore, StoreError, UserStore};
pub use validation::{validate_length, validate_password, PasswordPolicy};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

// ============================================================================
// Error Types
// ============================================================================

/// Failures surfaced by sign-up, sign-in and context resolution
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed input (length or password policy)
    #[error("{0}")]
    Validation(String),

    #[error("req.password and req.passwordConfirm don't match")]
    Mismatch,

    #[error("username already exists")]
    Conflict,

    #[error("user not found")]
    NotFound,

    #[error("password is incorrect")]
    InvalidCredentials,

    /// Bad, expired or forged session token
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

// ============================================================================
// Users
// ============================================================================

/// A registered user as held by the credential store
///
/// `password` is always an Argon2 PHC string; plaintext never reaches this
/// type. Deliberately not `Serialize` so the hash cannot leak into a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Sequential identifier assigned at registration ("1", "2", ...)
    pub id: String,
    pub username: String,
    /// Display name
    pub name: String,
    /// Salted password hash
    pub password: String,
    /// Profile picture URL, empty when unset
    pub picture: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Client-safe view of this user
    pub fn to_public(&self) -> UserPublic {
        UserPublic::from(self)
    }
}

/// Everything needed to register a user, minus the id the store assigns
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub picture: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            password_hash: password_hash.into(),
            picture: String::new(),
        }
    }
}

/// User fields exposed to clients and downstream resolvers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserPublic {
    pub id: String,
    pub username: String,
    pub name: String,
    pub picture: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            picture: user.picture.clone(),
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(AuthError::Conflict.to_string(), "username already exists");
        assert_eq!(AuthError::NotFound.to_string(), "user not found");
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "password is incorrect"
        );
        assert_eq!(
            AuthError::Mismatch.to_string(),
            "req.password and req.passwordConfirm don't match"
        );
        assert_eq!(
            AuthError::Validation("req.name is too short".to_string()).to_string(),
            "req.name is too short"
        );
    }

    #[test]
    fn test_public_projection_drops_password() {
        let user = User {
            id: "7".to_string(),
            username: "alice".to_string(),
            name: "Alice Doe".to_string(),
            password: "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".to_string(),
            picture: String::new(),
            created_at: Utc::now(),
        };

        let public = user.to_public();
        assert_eq!(public.id, "7");
        assert_eq!(public.username, "alice");

        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_new_user_defaults_to_empty_picture() {
        let new_user = NewUser::new("bob", "Bob Ross", "hash");
        assert!(new_user.picture.is_empty());
    }
}
