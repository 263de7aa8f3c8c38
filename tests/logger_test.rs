//! Transaction logger behaviour in front of plain handlers.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Request, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use sekolah_api::audit::{
    log_transaction, AuditRecord, AuditResult, AuditSink, SensitiveDataMasker, TransactionLogger,
    UserDirectory, MASK_MARKER,
};
use sekolah_api::auth::{PasswordHasher, TokenIssuer, TokenVerifier};
use sekolah_api::AppError;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

const SECRET: &str = "logger-integration-secret";

struct RecordingSink {
    records: Mutex<Vec<AuditRecord>>,
    ready: bool,
    fail: bool,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
            ready: true,
            fail: false,
        })
    }

    fn with(ready: bool, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
            ready,
            fail,
        })
    }

    fn snapshot(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }

    async fn wait_for(&self, count: usize) -> Vec<AuditRecord> {
        for _ in 0..100 {
            let records = self.snapshot();
            if records.len() >= count {
                return records;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("sink never received {} records", count);
    }
}

#[async_trait]
impl AuditSink for RecordingSink {
    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn persist(&self, record: AuditRecord) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::DatabaseError("disk full".to_string()));
        }
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

struct OneUser;

#[async_trait]
impl UserDirectory for OneUser {
    async fn find_id_by_email(&self, email: &str) -> Result<Option<String>, AppError> {
        Ok((email == "budi@sekolah.id").then(|| "u-7".to_string()))
    }
}

async fn echo(body: Bytes) -> Bytes {
    body
}

async fn hello() -> &'static str {
    "hello"
}

fn app(sink: Arc<RecordingSink>) -> Router {
    app_with_limit(sink, 64 * 1024)
}

fn app_with_limit(sink: Arc<RecordingSink>, body_limit: usize) -> Router {
    let logger = TransactionLogger::new(
        TokenVerifier::from_secret(SECRET).unwrap(),
        Arc::new(OneUser),
        sink,
        SensitiveDataMasker::new(PasswordHasher::new(4)),
        "unit-host",
        body_limit,
    );

    Router::new()
        .route("/echo", post(echo))
        .route("/api/hello", get(hello))
        .layer(middleware::from_fn_with_state(logger, log_transaction))
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_record_written_only_after_body_is_delivered() {
    let sink = RecordingSink::new();
    let response = app(sink.clone())
        .oneshot(Request::get("/api/hello").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(sink.snapshot().is_empty());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"hello");

    let records = sink.wait_for(1).await;
    assert_eq!(records[0].service_name, "api/hello");
    assert_eq!(records[0].response_body, json!("hello"));
    assert_eq!(records[0].result, AuditResult::Success);
    assert_eq!(records[0].device, "unit-host");
}

#[tokio::test]
async fn test_unready_sink_refuses_request() {
    let sink = RecordingSink::with(false, false);
    let response = app(sink.clone())
        .oneshot(Request::get("/api/hello").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 500);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(sink.snapshot().is_empty());
}

#[tokio::test]
async fn test_failed_persist_does_not_affect_client() {
    let sink = RecordingSink::with(true, true);
    let response = app(sink)
        .oneshot(Request::get("/api/hello").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"hello");
}

#[tokio::test]
async fn test_handler_sees_original_body_and_record_is_masked() {
    let sink = RecordingSink::new();
    let payload = json!({
        "email": "budi@sekolah.id",
        "password": "rahasia",
        "access_token": "tok"
    });

    let response = app(sink.clone())
        .oneshot(json_post("/echo", payload.clone()))
        .await
        .unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let echoed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(echoed, payload);

    let records = sink.wait_for(1).await;
    let record = &records[0];
    assert_eq!(record.user_id.as_deref(), Some("u-7"));
    assert_eq!(record.request_body["email"], "budi@sekolah.id");
    assert_eq!(record.request_body["access_token"], MASK_MARKER);

    let hashed = record.request_body["password"].as_str().unwrap();
    assert!(bcrypt::verify("rahasia", hashed).unwrap());
    // the response side is stored as sent
    assert_eq!(record.response_body["password"], "rahasia");
}

#[tokio::test]
async fn test_token_subject_and_query_params_recorded() {
    let sink = RecordingSink::new();
    let token = TokenIssuer::from_secret(SECRET, chrono::Duration::hours(1))
        .unwrap()
        .issue("u-42")
        .unwrap()
        .token;

    let request = Request::get("/api/hello?id=x&tag=a&tag=b")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app(sink.clone()).oneshot(request).await.unwrap();
    to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let records = sink.wait_for(1).await;
    let record = &records[0];
    assert_eq!(record.user_id.as_deref(), Some("u-42"));
    assert_eq!(record.request_params, json!({"id": ["x"], "tag": ["a", "b"]}));
    assert_eq!(record.request_body, json!({}));
    assert!(record.headers.get("authorization").is_some());
}

#[tokio::test]
async fn test_rejected_token_recorded_as_failure() {
    let sink = RecordingSink::new();
    let request = Request::get("/api/hello")
        .header(header::AUTHORIZATION, "Bearer forged")
        .body(Body::empty())
        .unwrap();

    let response = app(sink.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let records = sink.wait_for(1).await;
    assert_eq!(records[0].result, AuditResult::Failed);
    assert_eq!(records[0].user_id, None);
    assert_eq!(records[0].response_body["code"], 401);
}

#[tokio::test]
async fn test_unreadable_body_still_recorded() {
    let sink = RecordingSink::new();
    let payload = json!({"nama": "x".repeat(48)});

    let response = app_with_limit(sink.clone(), 16)
        .oneshot(json_post("/echo?id=x", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let records = sink.wait_for(1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sink.snapshot().len(), 1);

    let record = &records[0];
    assert_eq!(record.result, AuditResult::Failed);
    assert_eq!(record.user_id, None);
    assert_eq!(record.service_name, "echo");
    assert_eq!(record.request_body, json!({}));
    assert_eq!(record.request_params, json!({"id": ["x"]}));
    assert_eq!(record.response_body["code"], 400);
}

struct SlowSink {
    done: AtomicBool,
}

#[async_trait]
impl AuditSink for SlowSink {
    fn is_ready(&self) -> bool {
        true
    }

    async fn persist(&self, _record: AuditRecord) -> Result<(), AppError> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        self.done.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_slow_persistence_does_not_delay_response() {
    let sink = Arc::new(SlowSink {
        done: AtomicBool::new(false),
    });
    let logger = TransactionLogger::new(
        TokenVerifier::from_secret(SECRET).unwrap(),
        Arc::new(OneUser),
        sink.clone(),
        SensitiveDataMasker::new(PasswordHasher::new(4)),
        "unit-host",
        64 * 1024,
    );
    let router = Router::new()
        .route("/api/hello", get(hello))
        .layer(middleware::from_fn_with_state(logger, log_transaction));

    let started = std::time::Instant::now();
    let response = router
        .oneshot(Request::get("/api/hello").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    assert_eq!(&body[..], b"hello");
    assert!(started.elapsed() < Duration::from_millis(400));
    assert!(!sink.done.load(Ordering::SeqCst));

    for _ in 0..50 {
        if sink.done.load(Ordering::SeqCst) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("slow sink never finished");
}
