//! API route definitions

use crate::handlers::{auth, health};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create the public API routes
///
/// None of these require authentication; `/me` resolves the caller from the
/// session cookie and reports `null` when there is none.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/_ping", get(health::ping))
        .route("/sign-up", post(auth::sign_up_handler))
        .route("/sign-in", post(auth::sign_in_handler))
        .route("/me", get(auth::me_handler))
}
