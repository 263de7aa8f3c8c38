//! Transaction Logger
//!
//! Middleware that records every request/response pair. The request body is
//! buffered and replayed to the handler, the caller is identified from a
//! bearer token or the body's `email`, and the audit row is written by a
//! detached task once the response body has left the server.
//!
//! Delivery is at-most-once: a failed write is reported on the operator log
//! and dropped.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::capture::{DeliveryGuard, OutboundResponse, ResponseCapture};
use super::entry::{
    body_to_json, headers_to_json, query_to_json, service_name_from_path, AuditRecord,
    AuditResult,
};
use super::mask::SensitiveDataMasker;
use super::store::AuditSink;
use crate::auth::{bearer_token, AuthError, TokenVerifier};
use crate::error::AppError;

/// Email to user id lookup used to annotate unauthenticated requests.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_id_by_email(&self, email: &str) -> Result<Option<String>, AppError>;
}

#[derive(Clone)]
pub struct TransactionLogger {
    verifier: TokenVerifier,
    users: Arc<dyn UserDirectory>,
    sink: Arc<dyn AuditSink>,
    masker: SensitiveDataMasker,
    device: Arc<str>,
    body_limit: usize,
}

/// Request-side fields of a record, taken before the handler runs.
struct PendingRecord {
    timestamp: DateTime<Utc>,
    service_name: String,
    request_params: Value,
    headers: Value,
    raw_body: Bytes,
}

impl PendingRecord {
    fn new(parts: &Parts, raw_body: Bytes) -> Self {
        Self {
            timestamp: Utc::now(),
            service_name: service_name_from_path(parts.uri.path()),
            request_params: query_to_json(parts.uri.query()),
            headers: headers_to_json(&parts.headers),
            raw_body,
        }
    }
}

impl TransactionLogger {
    pub fn new(
        verifier: TokenVerifier,
        users: Arc<dyn UserDirectory>,
        sink: Arc<dyn AuditSink>,
        masker: SensitiveDataMasker,
        device: impl Into<Arc<str>>,
        body_limit: usize,
    ) -> Self {
        Self {
            verifier,
            users,
            sink,
            masker,
            device: device.into(),
            body_limit,
        }
    }

    /// Identify the caller for the audit row.
    ///
    /// A well-formed bearer header must carry a valid token; its failure is
    /// returned. Without one, the `email` field of a JSON body is looked up
    /// and any failure there yields `None`.
    pub async fn identify_for_audit(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Option<String>, AuthError> {
        if let Ok(token) = bearer_token(headers) {
            return self.verifier.verify(token).map(|claims| Some(claims.subject_id));
        }
        Ok(self.identify_by_email(body).await)
    }

    async fn identify_by_email(&self, body: &[u8]) -> Option<String> {
        let parsed: Value = serde_json::from_slice(body).ok()?;
        let email = parsed.get("email")?.as_str()?;

        match self.users.find_id_by_email(email).await {
            Ok(user_id) => user_id,
            Err(err) => {
                debug!("Audit identity lookup failed for {}: {}", email, err);
                None
            }
        }
    }

    /// Capture `response`, schedule the audit write, and hand back the
    /// response for the client.
    async fn finish(
        &self,
        pending: PendingRecord,
        user_id: Option<String>,
        response: Response,
    ) -> Response {
        let (mut parts, body) = response.into_parts();

        let chunks = match drain(body).await {
            Ok(chunks) => chunks,
            Err(err) => {
                error!("Handler body for {} failed: {}", pending.service_name, err);
                let (fallback_parts, fallback_body) =
                    AppError::Internal(err.to_string()).into_response().into_parts();
                parts = fallback_parts;
                drain(fallback_body).await.unwrap_or_default()
            }
        };

        let status = parts.status;
        let mut capture = ResponseCapture::new(OutboundResponse::new(parts));
        capture.set_status(status);
        for chunk in &chunks {
            capture.write(chunk);
        }

        let (outbound, status, response_body) = capture.into_parts();
        let (guard, delivered) = DeliveryGuard::new();

        let sink = Arc::clone(&self.sink);
        let masker = self.masker;
        let device = self.device.to_string();

        tokio::spawn(async move {
            // Resolves once the client body is done with.
            let _ = delivered.await;

            let raw = pending.raw_body;
            let masked = match tokio::task::spawn_blocking(move || masker.mask(&raw)).await {
                Ok(masked) => masked,
                Err(err) => {
                    error!("Masking task failed for {}: {}", pending.service_name, err);
                    return;
                }
            };

            let service_name = pending.service_name;
            let record = AuditRecord {
                id: None,
                timestamp: pending.timestamp,
                user_id,
                device,
                service_name: service_name.clone(),
                request_body: body_to_json(&masked),
                response_body: body_to_json(&response_body),
                request_params: pending.request_params,
                result: AuditResult::from_status(status),
                headers: pending.headers,
            };

            if let Err(err) = sink.persist(record).await {
                error!("Failed to persist audit record for {}: {}", service_name, err);
            }
        });

        outbound.into_response(guard)
    }
}

async fn drain(body: Body) -> Result<Vec<Bytes>, axum::Error> {
    let mut stream = body.into_data_stream();
    let mut chunks = Vec::new();
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk?);
    }
    Ok(chunks)
}

/// `from_fn_with_state` entry point for [`TransactionLogger`].
pub async fn log_transaction(
    State(logger): State<TransactionLogger>,
    request: Request,
    next: Next,
) -> Response {
    if !logger.sink.is_ready() {
        error!("Audit store is not available, refusing request");
        return AppError::Internal("Audit store is not initialised".to_string()).into_response();
    }

    let (parts, body) = request.into_parts();
    let raw_body = match to_bytes(body, logger.body_limit).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("Could not read body of {} {}: {}", parts.method, parts.uri, err);
            let pending = PendingRecord::new(&parts, Bytes::new());
            let response = AppError::MalformedInput("Request body could not be read".to_string())
                .into_response();
            return logger.finish(pending, None, response).await;
        }
    };

    let pending = PendingRecord::new(&parts, raw_body.clone());

    let user_id = match logger.identify_for_audit(&parts.headers, &raw_body).await {
        Ok(user_id) => user_id,
        Err(err) => {
            warn!("Rejected {} {}: {}", parts.method, parts.uri.path(), err);
            let response = AppError::from(err).into_response();
            return logger.finish(pending, None, response).await;
        }
    };

    let request = Request::from_parts(parts, Body::from(raw_body));
    let response = next.run(request).await;
    logger.finish(pending, user_id, response).await
}
