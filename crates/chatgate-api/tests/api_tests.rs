//! API Integration Tests
//!
//! Drive the full router (cookies, CORS, handlers, in-memory store) with
//! `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chatgate_api::auth::{JwtConfig, JwtIssuer};
use chatgate_api::{create_router, create_router_for_testing, state::AppState, state_for_testing};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Helper to create a JSON request
fn create_json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn alice_sign_up() -> Value {
    json!({
        "name": "Alice Doe",
        "username": "alice",
        "password": "Secret123",
        "passwordConfirm": "Secret123"
    })
}

async fn sign_up(app: &Router, body: Value) -> Response {
    app.clone()
        .oneshot(create_json_request("POST", "/sign-up", body))
        .await
        .unwrap()
}

async fn sign_in(app: &Router, username: &str, password: &str) -> Response {
    app.clone()
        .oneshot(create_json_request(
            "POST",
            "/sign-in",
            json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap()
}

async fn me(app: &Router, cookie: Option<&str>) -> Value {
    let mut builder = Request::builder().uri("/me");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// `authToken=<token>` from a sign-in response
fn auth_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().trim().to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_ping() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(Request::builder().uri("/_ping").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "pong");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/sign-up"].is_object());
    assert!(json["paths"]["/sign-in"].is_object());
}

// =============================================================================
// Sign-up / sign-in scenario
// =============================================================================

#[tokio::test]
async fn test_sign_up_sign_in_scenario() {
    let app = create_router_for_testing();

    // Register
    let response = sign_up(&app, alice_sign_up()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "id": "1" }));

    // Duplicate username
    let response = sign_up(&app, alice_sign_up()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "username already exists");

    // Sign in
    let response = sign_in(&app, "alice", "Secret123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("authToken="));
    assert!(set_cookie.contains("Max-Age=86400"));
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = auth_cookie(&response);
    assert_eq!(body_json(response).await, json!({ "id": "1" }));

    // Wrong password
    let response = sign_in(&app, "alice", "Secret124").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_text(response).await, "password is incorrect");

    // Context resolution with the issued cookie
    let json = me(&app, Some(cookie.as_str())).await;
    assert_eq!(json["currentUser"]["id"], "1");
    assert_eq!(json["currentUser"]["username"], "alice");
    assert_eq!(json["currentUser"]["name"], "Alice Doe");
    assert!(json["currentUser"].get("password").is_none());
}

#[tokio::test]
async fn test_sequential_ids() {
    let app = create_router_for_testing();

    sign_up(&app, alice_sign_up()).await;
    let response = sign_up(
        &app,
        json!({
            "name": "Bob Ross",
            "username": "bob",
            "password": "HappyTree1",
            "passwordConfirm": "HappyTree1"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "id": "2" }));
}

#[tokio::test]
async fn test_sign_in_unknown_user() {
    let app = create_router_for_testing();

    let response = sign_in(&app, "nobody", "Secret123").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "user not found");
}

// =============================================================================
// Sign-up validation
// =============================================================================

#[tokio::test]
async fn test_sign_up_password_mismatch() {
    let app = create_router_for_testing();

    let mut body = alice_sign_up();
    body["passwordConfirm"] = json!("Secret124");

    let response = sign_up(&app, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_text(response).await,
        "req.password and req.passwordConfirm don't match"
    );

    // Nothing was created
    let response = sign_in(&app, "alice", "Secret123").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sign_up_rejects_long_username() {
    let app = create_router_for_testing();

    let mut body = alice_sign_up();
    body["username"] = json!("a_username_far_too_long");

    let response = sign_up(&app, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_text(response).await;
    assert!(message.contains("req.username"), "{message}");
    assert!(message.contains("18"), "{message}");
}

#[tokio::test]
async fn test_sign_up_rejects_weak_password() {
    let app = create_router_for_testing();

    let mut body = alice_sign_up();
    body["password"] = json!("password");
    body["passwordConfirm"] = json!("password");

    let response = sign_up(&app, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("req.password"));
}

#[tokio::test]
async fn test_sign_up_missing_fields() {
    let app = create_router_for_testing();

    let response = sign_up(&app, json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("req.name"));
}

#[tokio::test]
async fn test_sign_up_mistyped_field_is_bad_request() {
    let app = create_router_for_testing();

    let response = sign_up(&app, json!({ "name": 5 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!body_text(response).await.is_empty());
}

#[tokio::test]
async fn test_sign_in_without_json_content_type_is_bad_request() {
    let app = create_router_for_testing();
    sign_up(&app, alice_sign_up()).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sign-in")
                .body(Body::from(r#"{"username":"alice","password":"Secret123"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("Content-Type"));
}

#[tokio::test]
async fn test_configured_password_policy_applies() {
    let mut state = state_for_testing();
    state.config.password_policy.min_length = 12;
    let app = create_router(Arc::new(AppState::new(state.config)));

    let response = sign_up(&app, alice_sign_up()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_text(response).await,
        "req.password must be at least 12 characters long"
    );

    let mut body = alice_sign_up();
    body["password"] = json!("Secret123456");
    body["passwordConfirm"] = json!("Secret123456");
    let response = sign_up(&app, body).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Context resolution
// =============================================================================

#[tokio::test]
async fn test_me_without_cookie_is_unauthenticated() {
    let app = create_router_for_testing();

    let json = me(&app, None).await;
    assert_eq!(json, json!({ "currentUser": null }));
}

#[tokio::test]
async fn test_me_with_bad_cookie_is_unauthenticated() {
    let app = create_router_for_testing();
    sign_up(&app, alice_sign_up()).await;

    let json = me(&app, Some("authToken=not.a.token")).await;
    assert!(json["currentUser"].is_null());
}

#[tokio::test]
async fn test_me_with_expired_cookie_is_unauthenticated() {
    let state = state_for_testing();
    let expired = JwtIssuer::new(JwtConfig::from(state.config.auth.clone()))
        .issue_at("alice", 0)
        .unwrap();
    let app = create_router(Arc::new(state));
    sign_up(&app, alice_sign_up()).await;

    let cookie = format!("authToken={expired}");
    let json = me(&app, Some(cookie.as_str())).await;
    assert!(json["currentUser"].is_null());
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_cors_allows_configured_origin_with_credentials() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/sign-in")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}
