//! chatgate API - authentication service for the chat application
//!
//! Provides HTTP endpoints for sign-up, sign-in and current-user lookup, and
//! the request context consumed by downstream resolvers.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pubsub;
pub mod routes;
pub mod state;

use crate::auth::{SignInRequest, SignUpRequest};
use crate::handlers::auth::{IdResponse, MeResponse};
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use chatgate_core::UserPublic;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document for the service
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::ping,
        handlers::auth::sign_up_handler,
        handlers::auth::sign_in_handler,
        handlers::auth::me_handler,
    ),
    components(schemas(SignUpRequest, SignInRequest, IdResponse, MeResponse, UserPublic)),
    tags(
        (name = "auth", description = "Sign-up, sign-in and session context"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.origin);

    Router::new()
        .merge(routes::api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS for the single configured front-end origin, with credentials so the
/// browser sends and accepts the session cookie
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!(%origin, "invalid CORS origin, cross-origin requests will be refused");
            layer
        }
    }
}

/// Router with an empty store and cheap password hashing, for tests
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    create_router(Arc::new(state_for_testing()))
}

/// State behind [`create_router_for_testing`]
#[cfg(any(test, feature = "test-utils"))]
pub fn state_for_testing() -> AppState {
    let mut config = chatgate_core::AppConfig::default();
    config.auth.secret = "test-secret".to_string();
    config.hasher = chatgate_core::HasherConfig {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
        output_len: 32,
    };
    AppState::new(config)
}
