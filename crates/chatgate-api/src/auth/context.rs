//! Per-request context resolution
//!
//! Turns the `authToken` cookie into the `currentUser` seen by downstream
//! resolvers. A missing, invalid or expired token is not an error: the
//! context is simply unauthenticated and each consumer decides what to do.

use super::service::AuthService;
use crate::pubsub::PubSub;
use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chatgate_core::UserPublic;
use std::convert::Infallible;
use std::sync::Arc;
use tower_cookies::Cookies;

/// Name of the cookie carrying the session token
pub const AUTH_COOKIE: &str = "authToken";

/// What every downstream resolver gets to see about the request
///
/// Extract it in a handler like any other extractor:
///
/// ```ignore
/// async fn handler(ctx: RequestContext) -> String {
///     match ctx.current_user {
///         Some(user) => format!("Hello, {}!", user.name),
///         None => "Hello, stranger".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The signed-in user, if the request carried a valid session token
    pub current_user: Option<UserPublic>,
    /// Shared pub/sub handle
    pub pubsub: PubSub,
}

impl RequestContext {
    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .extensions
            .get::<Cookies>()
            .and_then(|cookies| cookies.get(AUTH_COOKIE))
            .map(|cookie| cookie.value().to_string());

        let current_user = resolve_current_user(&state.auth, token.as_deref()).await;

        Ok(Self {
            current_user,
            pubsub: state.pubsub.clone(),
        })
    }
}

/// Resolve a session token to its user, degrading every failure to `None`
pub async fn resolve_current_user(auth: &AuthService, token: Option<&str>) -> Option<UserPublic> {
    let token = token.filter(|t| !t.is_empty())?;

    match auth.authenticate(token).await {
        Ok(user) => Some(user),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring session token");
            None
        }
    }
}
