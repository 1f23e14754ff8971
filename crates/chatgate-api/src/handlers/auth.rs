//! Authentication API handlers
//!
//! Sign-up, sign-in, and the current-user lookup built on request context
//! resolution.

use crate::auth::{RequestContext, SignInRequest, SignUpRequest, AUTH_COOKIE};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use chatgate_core::UserPublic;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_cookies::{cookie::time::Duration, Cookie, Cookies};
use utoipa::ToSchema;

/// Identifier of the user a request acted on
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdResponse {
    pub id: String,
}

/// Current user as resolved from the session cookie
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    #[serde(rename = "currentUser")]
    pub current_user: Option<UserPublic>,
}

/// Register a new user account
///
/// # Request Body
///
/// * `name` - Display name (3-50 characters)
/// * `username` - Unique login name (3-18 characters)
/// * `password` - At least 8 characters with a letter and a digit
/// * `passwordConfirm` - Must equal `password`
///
/// # Responses
///
/// * `200 OK` - `{ "id": ... }` of the new user
/// * `400 Bad Request` - Validation failure, mismatch, duplicate username or
///   unreadable body
#[utoipa::path(
    post,
    path = "/sign-up",
    tag = "auth",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "User registered", body = IdResponse),
        (status = 400, description = "Invalid input or username taken", body = String),
    )
)]
pub async fn sign_up_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let user = state.auth.sign_up(request).await.inspect_err(|err| {
        tracing::debug!(error = %err, "sign-up rejected");
    })?;

    Ok(Json(IdResponse { id: user.id }))
}

/// Sign in with username and password
///
/// On success the session token is set as the `authToken` cookie with a
/// max-age equal to the token lifetime.
///
/// # Responses
///
/// * `200 OK` - `{ "id": ... }` plus `Set-Cookie`
/// * `400 Bad Request` - Password is incorrect or unreadable body
/// * `404 Not Found` - Unknown username
#[utoipa::path(
    post,
    path = "/sign-in",
    tag = "auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in, authToken cookie set", body = IdResponse),
        (status = 400, description = "Password is incorrect", body = String),
        (status = 404, description = "User not found", body = String),
    )
)]
pub async fn sign_in_handler(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let outcome = state.auth.sign_in(request).await?;

    let lifetime = state.auth.tokens().lifetime();
    let max_age = Duration::seconds(i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX));

    let cookie = Cookie::build((AUTH_COOKIE, outcome.token))
        .path("/")
        .http_only(true)
        .max_age(max_age)
        .build();
    cookies.add(cookie);

    Ok(Json(IdResponse {
        id: outcome.user.id,
    }))
}

/// Get the user the session cookie belongs to
///
/// Never fails on a bad token: an unauthenticated request simply gets
/// `currentUser: null`.
#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    responses(
        (status = 200, description = "Resolved current user, or null", body = MeResponse),
    )
)]
pub async fn me_handler(ctx: RequestContext) -> impl IntoResponse {
    Json(MeResponse {
        current_user: ctx.current_user,
    })
}
