//! Application state management

use crate::auth::jwt::{JwtConfig, JwtIssuer, TokenIssuer};
use crate::auth::password::PasswordConfig;
use crate::auth::service::AuthService;
use crate::pubsub::PubSub;
use chatgate_core::{AppConfig, InMemoryUserStore, UserStore};
use std::sync::Arc;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Sign-up, sign-in and token resolution
    pub auth: AuthService,
    /// Pub/sub hub exposed to request contexts
    pub pubsub: PubSub,
}

impl AppState {
    /// Create state with an empty in-memory store and a JWT issuer built
    /// from `config.auth`
    pub fn new(config: AppConfig) -> Self {
        let tokens = Arc::new(JwtIssuer::new(JwtConfig::from(config.auth.clone())));
        Self::with_components(config, Arc::new(InMemoryUserStore::new()), tokens)
    }

    /// Create state around an existing store and token issuer
    pub fn with_components(
        config: AppConfig,
        store: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        let auth = AuthService::new(
            store,
            tokens,
            PasswordConfig::from(config.hasher.clone()),
            config.password_policy.clone(),
        );

        Self {
            config,
            auth,
            pubsub: PubSub::default(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
