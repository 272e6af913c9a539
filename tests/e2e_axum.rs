//! End-to-end tests for the axum HTTP surface.
//!
//! Mock repositories only, no database.
//! Run with: `cargo test --features "axum_api mocks" --test e2e_axum`

#![cfg(all(feature = "axum_api", feature = "mocks"))]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::Duration;
use gatehouse::api::axum::{AppState, router};
use gatehouse::clock::Clock;
use gatehouse::crypto::Argon2Hasher;
use gatehouse::csrf::{CsrfGuard, CsrfService};
use gatehouse::jwt::{JwtConfig, JwtService, TokenSigner};
use gatehouse::{FixedClock, GatehouseConfig, MockRefreshTokenRepository, MockUserRepository};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const JWT_SECRET: &str = "e2e-jwt-secret-at-least-32-bytes!";
const CSRF_SECRET: &str = "e2e-csrf-secret";

struct TestApp {
    router: Router,
    clock: FixedClock,
    signer: JwtService,
    refresh_repo: MockRefreshTokenRepository,
}

fn create_app_with(config: GatehouseConfig) -> TestApp {
    let clock = FixedClock::default();
    let signer = JwtService::new(JwtConfig::new(JWT_SECRET).unwrap());
    let refresh_repo = MockRefreshTokenRepository::new();
    let csrf = CsrfGuard::new(CsrfService::new(CSRF_SECRET).unwrap());

    let state = AppState::new(
        MockUserRepository::new(),
        refresh_repo.clone(),
        signer.clone(),
        csrf,
    )
    .with_config(config)
    .with_hasher(Arc::new(Argon2Hasher::new(1024, 1, 1)))
    .with_clock(Arc::new(clock.clone()));

    TestApp {
        router: router(state),
        clock,
        signer,
        refresh_repo,
    }
}

fn create_app() -> TestApp {
    create_app_with(GatehouseConfig::default())
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn post_json(uri: &str, csrf: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = csrf {
        builder = builder.header("X-CSRF-Token", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn post_form(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn csrf_token(app: &TestApp) -> String {
    let request = Request::builder().uri("/csrf/get").body(Body::empty()).unwrap();
    let (status, _, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    body["csrf_token"].as_str().unwrap().to_owned()
}

async fn register(app: &TestApp, csrf: &str) -> Value {
    let (status, _, body) = send(
        app,
        post_json(
            "/register",
            Some(csrf),
            &json!({
                "name": "Test User",
                "email": "testuser@example.com",
                "password": "securepassword"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn test_healthcheck() {
    let app = create_app();

    let request = Request::builder().uri("/healthcheck").body(Body::empty()).unwrap();
    let (status, _, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_csrf_get_sets_cookie() {
    let app = create_app();

    let request = Request::builder().uri("/csrf/get").body(Body::empty()).unwrap();
    let (status, headers, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let token = body["csrf_token"].as_str().unwrap();
    assert!(!token.is_empty());

    let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
    assert_eq!(
        cookie,
        format!("csrf_token={token}; Max-Age=3600; Path=/; HttpOnly")
    );
}

#[tokio::test]
async fn test_missing_csrf_token() {
    let app = create_app();

    let (status, _, body) = send(
        &app,
        post_json("/auth/login", None, &json!({"email": "a@b.co", "password": "x"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "not set csrf token");
    assert!(app.refresh_repo.is_empty());
}

#[tokio::test]
async fn test_invalid_csrf_token() {
    let app = create_app();

    let (status, _, body) = send(
        &app,
        post_json(
            "/auth/login",
            Some("bm90LWEtdG9rZW4"),
            &json!({"email": "a@b.co", "password": "x"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "invalid csrf token");
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let app = create_app();
    let foreign = CsrfService::new("some-other-secret")
        .unwrap()
        .issue(app.clock.now());

    let (status, _, _) = send(&app, post_json("/register", Some(&foreign), &json!({}))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expired_csrf_token() {
    let app = create_app();
    let token = csrf_token(&app).await;
    app.clock.advance(Duration::seconds(3601));

    let (status, _, body) = send(&app, post_json("/register", Some(&token), &json!({}))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "invalid csrf token");
}

#[tokio::test]
async fn test_csrf_token_from_cookie() {
    let app = create_app();
    let token = csrf_token(&app).await;

    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, format!("theme=dark; csrf_token={token}"))
        .body(Body::from(
            json!({
                "name": "Test User",
                "email": "testuser@example.com",
                "password": "securepassword"
            })
            .to_string(),
        ))
        .unwrap();
    let (status, _, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_csrf_token_from_form_field() {
    let app = create_app();
    let token = csrf_token(&app).await;

    let (status, _, body) = send(
        &app,
        post_form(
            "/register",
            format!("name=Test+User&email=testuser%40example.com&password=securepassword&_token={token}"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["username"], "Test User");
    assert_eq!(body["email"], "testuser@example.com");
}

#[tokio::test]
async fn test_form_encoded_login_and_refresh() {
    let app = create_app();
    let token = csrf_token(&app).await;
    register(&app, &token).await;

    let (status, _, tokens) = send(
        &app,
        post_form(
            "/auth/login",
            format!("email=testuser%40example.com&password=securepassword&_token={token}"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{tokens}");
    assert_eq!(tokens["token_type"], "Bearer");

    let refresh_token = tokens["refresh_token"].as_str().unwrap();
    let (status, _, rotated) = send(
        &app,
        post_form(
            "/auth/refresh",
            format!("refresh_token={refresh_token}&_token={token}"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{rotated}");
    assert_ne!(rotated["refresh_token"], tokens["refresh_token"]);
}

#[tokio::test]
async fn test_form_without_csrf_field_rejected() {
    let app = create_app();

    let (status, _, body) = send(
        &app,
        post_form(
            "/register",
            "name=Test+User&email=testuser%40example.com&password=securepassword".to_owned(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "not set csrf token");
}

#[tokio::test]
async fn test_options_is_not_exempt() {
    let app = create_app();

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/register")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "not set csrf token");
}

#[tokio::test]
async fn test_register_login_refresh_flow() {
    let app = create_app();
    let csrf = csrf_token(&app).await;

    let user = register(&app, &csrf).await;
    assert_eq!(user["username"], "Test User");
    assert_eq!(user["email"], "testuser@example.com");
    let uuid = user["uuid"].as_str().unwrap().to_owned();
    assert!(user.get("id").is_none());

    let (status, _, tokens) = send(
        &app,
        post_json(
            "/auth/login",
            Some(&csrf),
            &json!({"email": "testuser@example.com", "password": "securepassword"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{tokens}");
    assert_eq!(tokens["token_type"], "Bearer");
    assert_eq!(tokens["expires_in"], 3600);

    let claims = app
        .signer
        .verify(tokens["access_token"].as_str().unwrap(), app.clock.now())
        .unwrap();
    assert_eq!(claims.sub, uuid);
    assert_eq!(claims.email, "testuser@example.com");

    let refresh_token = tokens["refresh_token"].as_str().unwrap().to_owned();
    assert!(!refresh_token.is_empty());

    let refresh = || {
        let mut request = post_json(
            "/auth/refresh",
            Some(&csrf),
            &json!({"refresh_token": refresh_token}),
        );
        request
            .headers_mut()
            .insert("X-Forwarded-For", "127.0.0.1".parse().unwrap());
        request
    };

    let (status, _, rotated) = send(&app, refresh()).await;
    assert_eq!(status, StatusCode::OK, "{rotated}");
    assert_ne!(rotated["refresh_token"], tokens["refresh_token"]);

    let (status, _, body) = send(&app, refresh()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "TOKEN_ALREADY_USED");

    let used_ip = app
        .refresh_repo
        .tokens
        .lock()
        .unwrap()
        .iter()
        .find(|t| t.used)
        .and_then(|t| t.used_ip.clone());
    assert_eq!(used_ip.as_deref(), Some("127.0.0.1"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = create_app();
    let csrf = csrf_token(&app).await;
    register(&app, &csrf).await;

    let (status, _, body) = send(
        &app,
        post_json(
            "/register",
            Some(&csrf),
            &json!({
                "name": "Someone Else",
                "email": "TestUser@example.com",
                "password": "anotherpassword"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "USER_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_validation() {
    let app = create_app();
    let csrf = csrf_token(&app).await;

    let (status, _, body) = send(
        &app,
        post_json(
            "/register",
            Some(&csrf),
            &json!({"name": "Test User", "email": "testuser@example.com", "password": "short"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _, _) = send(
        &app,
        post_json("/register", Some(&csrf), &json!({"email": "testuser@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_hide_reason_by_default() {
    let app = create_app();
    let csrf = csrf_token(&app).await;
    register(&app, &csrf).await;

    let (status, _, wrong_password) = send(
        &app,
        post_json(
            "/auth/login",
            Some(&csrf),
            &json!({"email": "testuser@example.com", "password": "wrongpassword"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, _, unknown_email) = send(
        &app,
        post_json(
            "/auth/login",
            Some(&csrf),
            &json!({"email": "nobody@example.com", "password": "securepassword"}),
        ),
    )
    .await;

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["error"], "Invalid email or password");
    assert!(app.refresh_repo.is_empty());
}

#[tokio::test]
async fn test_login_failures_exposed_when_configured() {
    let mut config = GatehouseConfig::default();
    config.login.expose_credential_failure = true;
    let app = create_app_with(config);
    let csrf = csrf_token(&app).await;
    register(&app, &csrf).await;

    let (_, _, body) = send(
        &app,
        post_json(
            "/auth/login",
            Some(&csrf),
            &json!({"email": "testuser@example.com", "password": "wrongpassword"}),
        ),
    )
    .await;
    assert_eq!(body["error"], "invalid password");

    let (_, _, body) = send(
        &app,
        post_json(
            "/auth/login",
            Some(&csrf),
            &json!({"email": "nobody@example.com", "password": "securepassword"}),
        ),
    )
    .await;
    assert_eq!(body["error"], "invalid email");
}

#[tokio::test]
async fn test_login_validation() {
    let app = create_app();
    let csrf = csrf_token(&app).await;

    let (status, _, _) = send(
        &app,
        post_json("/auth/login", Some(&csrf), &json!({"email": "not-an-email", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .header("X-CSRF-Token", &csrf)
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_short_password_is_validation_error() {
    let app = create_app();
    let csrf = csrf_token(&app).await;
    register(&app, &csrf).await;

    let (status, _, body) = send(
        &app,
        post_json(
            "/auth/login",
            Some(&csrf),
            &json!({"email": "testuser@example.com", "password": "short"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(app.refresh_repo.is_empty());

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .header("X-CSRF-Token", &csrf)
        .body(Body::from(json!({"email": "testuser@example.com"}).to_string()))
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_refresh_unknown_token() {
    let app = create_app();
    let csrf = csrf_token(&app).await;

    let (status, _, body) = send(
        &app,
        post_json("/auth/refresh", Some(&csrf), &json!({"refresh_token": "abcdef"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "TOKEN_NOT_FOUND");
}

#[tokio::test]
async fn test_refresh_missing_token() {
    let app = create_app();
    let csrf = csrf_token(&app).await;

    let (status, _, body) = send(&app, post_json("/auth/refresh", Some(&csrf), &json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "refresh_token is required");
}
