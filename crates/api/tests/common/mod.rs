#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use userauth_api::auth::jwt::TokenService;
use userauth_api::auth::password::CredentialHasher;
use userauth_api::config::ServerConfig;
use userauth_api::router::build_app_router;
use userauth_api::state::AppState;
use userauth_core::roles::Role;
use userauth_db::models::user::User;
use userauth_db::MemoryUserStore;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "test_password_123";

/// Build a test `ServerConfig` with safe defaults and the cheapest bcrypt cost.
pub fn test_config() -> ServerConfig {
    let env: HashMap<&str, &str> = HashMap::from([
        ("HOST", "127.0.0.1"),
        ("PORT", "0"),
        ("USER_DB_URL", "memory://"),
        ("JWT_SECRET", TEST_SECRET),
        ("BCRYPT_PEPPER", "integration-pepper"),
        ("BCRYPT_COST", "4"),
    ]);
    ServerConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
        .expect("test config should be valid")
}

/// A router over a fresh in-memory store, plus handles for seeding and inspection.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryUserStore>,
}

/// Build the full application router with all middleware layers, exactly as
/// the binary does, backed by a [`MemoryUserStore`].
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryUserStore::new());
    let hasher = CredentialHasher::new(config.hasher.pepper.as_str(), config.hasher.cost);
    let state = AppState::new(store.clone(), hasher, TokenService::new(&config.jwt));
    let router = build_app_router(state.clone(), &config);
    TestApp {
        router,
        state,
        store,
    }
}

impl TestApp {
    /// Insert a user directly, bypassing the admin-only signup route.
    pub async fn seed_user(&self, username: &str, role: Role) -> User {
        self.state
            .accounts
            .create_user(&format!("{username}@test.com"), username, TEST_PASSWORD, role)
            .await
            .expect("user creation should succeed")
    }

    /// Log in through the API and return the access token.
    pub async fn access_token(&self, identifier: &str) -> String {
        let json = self.login(identifier, TEST_PASSWORD).await;
        json["access_token"]
            .as_str()
            .expect("login response must contain access_token")
            .to_string()
    }

    /// Log in through the API, asserting success, and return the JSON body.
    pub async fn login(&self, identifier: &str, password: &str) -> serde_json::Value {
        let response = post_form(
            self.router.clone(),
            "/user/login",
            &[("username", identifier), ("password", password)],
        )
        .await;
        assert_eq!(response.status(), 200, "login should succeed");
        body_json(response).await
    }
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn get_with_header(app: Router, uri: &str, authorization: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, authorization)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, &body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), &body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), &body)).await
}

pub async fn delete_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::DELETE, uri, Some(token), &body)).await
}

pub async fn post_form(app: Router, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("request should build");
    send(app, request).await
}

/// POST a raw body with an explicit content type, bypassing JSON encoding.
pub async fn post_raw_auth(
    app: Router,
    uri: &str,
    token: &str,
    content_type: &str,
    body: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, content_type)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request should build");
    send(app, request).await
}

/// Minimal `application/x-www-form-urlencoded` encoding for test values.
fn form_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                char::from(b).to_string()
            }
            b' ' => "+".to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
