//! Authentication service layer
//!
//! Business logic for sign-up and sign-in. HTTP concerns (status codes,
//! cookies) stay in the handlers; this layer speaks `AuthError`.

use super::jwt::TokenIssuer;
use super::password::{hash_password_with_config, verify_password, PasswordConfig};
use chatgate_core::{
    validate_length, AuthError, NewUser, PasswordPolicy, User, UserPublic, UserStore,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Sign-up request
///
/// Missing fields deserialize as empty strings so they fail validation with
/// a readable message instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SignUpRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

/// Sign-in request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

/// Successful sign-in: the user and the session token to hand back
#[derive(Debug, Clone)]
pub struct SignInOutcome {
    pub user: UserPublic,
    pub token: String,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenIssuer>,
    password_config: PasswordConfig,
    password_policy: PasswordPolicy,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenIssuer>,
        password_config: PasswordConfig,
        password_policy: PasswordPolicy,
    ) -> Self {
        Self {
            store,
            tokens,
            password_config,
            password_policy,
        }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn tokens(&self) -> &Arc<dyn TokenIssuer> {
        &self.tokens
    }

    /// Register a new user
    ///
    /// All validation happens before the store is touched; the insert is the
    /// last step, so a failure at any point leaves the store unchanged.
    ///
    /// # Returns
    ///
    /// * `Ok(UserPublic)` - Newly created user
    /// * `Err(AuthError)` - `Validation`, `Mismatch` or `Conflict`
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<UserPublic, AuthError> {
        validate_length("req.name", &request.name, 3, 50)?;
        validate_length("req.username", &request.username, 3, 18)?;
        self.password_policy
            .validate("req.password", &request.password)?;

        if request.password != request.password_confirm {
            return Err(AuthError::Mismatch);
        }

        // Cheap pre-check so a duplicate never pays for a hash; the insert
        // below re-checks atomically.
        if self.store.find_by_username(&request.username).await?.is_some() {
            return Err(AuthError::Conflict);
        }

        let password_hash = self.hash(request.password).await?;

        let user = self
            .store
            .insert(NewUser::new(request.username, request.name, password_hash))
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "user signed up");
        Ok(user.to_public())
    }

    /// Check credentials and issue a session token
    ///
    /// # Returns
    ///
    /// * `Ok(SignInOutcome)` - User and a freshly signed token
    /// * `Err(AuthError)` - `NotFound` or `InvalidCredentials`
    pub async fn sign_in(&self, request: SignInRequest) -> Result<SignInOutcome, AuthError> {
        let user = self
            .store
            .find_by_username(&request.username)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !self.verify(request.password, &user).await? {
            tracing::warn!(username = %user.username, "sign-in with incorrect password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.username)?;

        tracing::info!(user_id = %user.id, username = %user.username, "user signed in");
        Ok(SignInOutcome {
            user: user.to_public(),
            token,
        })
    }

    /// Resolve the user a session token belongs to
    ///
    /// Fails with `InvalidToken` for a bad or expired token, and also when
    /// the token is valid but names a user the store does not know.
    pub async fn authenticate(&self, token: &str) -> Result<UserPublic, AuthError> {
        let username = self.tokens.verify(token)?;

        self.store
            .find_by_username(&username)
            .await?
            .map(|user| user.to_public())
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown user {username}")))
    }

    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let config = self.password_config.clone();
        tokio::task::spawn_blocking(move || hash_password_with_config(&password, &config))
            .await
            .map_err(|e| AuthError::Internal(format!("password hashing task failed: {e}")))?
            .map_err(AuthError::from)
    }

    async fn verify(&self, password: String, user: &User) -> Result<bool, AuthError> {
        let hash = user.password.clone();
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("password verification task failed: {e}")))?
            .map_err(AuthError::from)
    }
}
