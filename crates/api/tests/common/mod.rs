#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use agora_api::auth::jwt::JwtConfig;
use agora_api::config::{ServerConfig, SessionBackend};
use agora_api::router::build_app_router;
use agora_api::state::AppState;
use agora_core::kv::{KeyValueStore, KvError, MemoryKeyValueStore};
use agora_core::pagination::PageLimits;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// and in-memory sessions.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        db_max_connections: 5,
        jwt: JwtConfig {
            secret: "test-jwt-secret".to_string(),
            access_token_expiry_mins: 30,
        },
        cursor_secret: "test-cursor-secret".to_string(),
        page_limits: PageLimits::default(),
        session_backend: SessionBackend::Memory,
        session_sweep_interval_secs: 60,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and a fresh in-memory session store.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_kv(pool, Arc::new(MemoryKeyValueStore::new()))
}

/// Like [`build_test_app`] with an explicit session backend.
pub fn build_test_app_with_kv(pool: PgPool, kv: Arc<dyn KeyValueStore>) -> Router {
    let config = test_config();
    let state = AppState::with_kv(pool, config.clone(), kv);
    build_app_router(state, &config)
}

/// Session backend whose every call fails, as if the store were down.
pub struct UnreachableStore;

fn refused() -> KvError {
    KvError("connection refused".into())
}

#[async_trait]
impl KeyValueStore for UnreachableStore {
    async fn set_ex(&self, _: &str, _: &str, _: Duration) -> Result<(), KvError> {
        Err(refused())
    }
    async fn get(&self, _: &str) -> Result<Option<String>, KvError> {
        Err(refused())
    }
    async fn delete(&self, _: &str) -> Result<bool, KvError> {
        Err(refused())
    }
    async fn replace_ex(&self, _: &str, _: &str, _: &str, _: Duration) -> Result<bool, KvError> {
        Err(refused())
    }
    async fn delete_if(&self, _: &str, _: &str) -> Result<bool, KvError> {
        Err(refused())
    }
    async fn purge_expired(&self) -> Result<u64, KvError> {
        Err(refused())
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Sign up a user through the API and return its JSON representation.
pub async fn signup(app: &Router, email: &str) -> Value {
    let body = json!({ "fullname": "Test User", "email": email, "password": PASSWORD });
    let response = post_json(app.clone(), "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Log in and return the bearer token.
pub async fn login(app: &Router, email: &str) -> String {
    let body = json!({ "email": email, "password": PASSWORD });
    let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Sign up and log in; returns `(user_id, token)`.
pub async fn register(app: &Router, email: &str) -> (i64, String) {
    let user = signup(app, email).await;
    let token = login(app, email).await;
    (user["id"].as_i64().unwrap(), token)
}

/// Create a board and return its JSON representation.
pub async fn create_board(app: &Router, token: &str, name: &str, public: bool) -> Value {
    let body = json!({ "name": name, "public": public });
    let response = post_json_auth(app.clone(), "/api/v1/boards", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Create a post and return its JSON representation.
pub async fn create_post(app: &Router, token: &str, board_id: i64, title: &str) -> Value {
    let body = json!({ "title": title, "content": format!("{title} body") });
    let uri = format!("/api/v1/boards/{board_id}/posts");
    let response = post_json_auth(app.clone(), &uri, body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}
