#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use sekolah_api::audit::{AuditRecord, AuditSink, AuditStore, TransactionLogger};
use sekolah_api::auth::{PasswordHasher, TokenIssuer};
use sekolah_api::{api, AppConfig, AppState, Database};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: SECRET.to_string(),
        bcrypt_cost: 4,
        device_name: "test-host".to_string(),
        ..AppConfig::default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

impl TestApp {
    pub fn audit(&self) -> AuditStore {
        AuditStore::new(self.db.pool().clone())
    }
}

/// Full application over a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    let db = Database::new_in_memory()
        .await
        .expect("Failed to create test database");
    let router = sekolah_api::build_app(&test_config(), db.clone()).expect("Failed to build app");
    TestApp { router, db }
}

/// Application whose audit records go to `sink` instead of the database.
pub async fn spawn_app_with_sink(sink: Arc<dyn AuditSink>) -> TestApp {
    let config = test_config();
    let db = Database::new_in_memory()
        .await
        .expect("Failed to create test database");
    let state = AppState::new(&config, db.clone()).expect("Failed to build state");
    let logger = TransactionLogger::new(
        state.verifier.clone(),
        Arc::new(sekolah_api::features::users::SqlUserRepository::new(db.pool().clone())),
        sink,
        sekolah_api::audit::SensitiveDataMasker::new(PasswordHasher::new(config.bcrypt_cost)),
        config.device_name.clone(),
        config.body_limit_bytes,
    );
    TestApp {
        router: api::router(state, logger),
        db,
    }
}

pub fn token_for(subject: &str) -> String {
    TokenIssuer::from_secret(SECRET, chrono::Duration::hours(1))
        .unwrap()
        .issue(subject)
        .unwrap()
        .token
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and read the whole response body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    };
    (status, body)
}

/// Register an account and log in with it. Returns `(user_id, token)`.
pub async fn register_and_login(router: &Router, email: &str) -> (String, String) {
    let (status, body) = send(
        router,
        request(
            "POST",
            "/users/tambah",
            None,
            Some(json!({
                "username": "admin",
                "email": email,
                "password": "rahasia",
                "role": "admin"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    let (status, body) = send(
        router,
        request(
            "POST",
            "/login",
            None,
            Some(json!({"email": email, "password": "rahasia"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    (
        body["data"]["id"].as_str().unwrap().to_string(),
        body["data"]["token"].as_str().unwrap().to_string(),
    )
}

/// Poll the audit table until it holds at least `count` rows.
pub async fn wait_for_audit(store: &AuditStore, count: i64) -> Vec<AuditRecord> {
    for _ in 0..100 {
        if store.count().await.unwrap() >= count {
            return store.recent(count.max(1) * 10).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("audit table never reached {} rows", count);
}
