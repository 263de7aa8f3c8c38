//! Response capture
//!
//! [`ResponseCapture`] sits between a handler's output and the real response
//! sink. It records the status and a copy of every body chunk while passing
//! both through untouched.

use axum::{
    body::{Body, Bytes},
    http::{response::Parts, StatusCode},
    response::Response,
};
use futures::stream::{self, StreamExt};
use std::convert::Infallible;
use tokio::sync::oneshot;

/// Destination of a response: a status line followed by body chunks.
pub trait ResponseSink {
    fn write_status(&mut self, status: StatusCode);
    fn write_body(&mut self, chunk: &[u8]);
}

pub struct ResponseCapture<S: ResponseSink> {
    inner: S,
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl<S: ResponseSink> ResponseCapture<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            status: None,
            body: Vec::new(),
        }
    }

    /// Only the first status is recorded and forwarded.
    pub fn set_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
            self.inner.write_status(status);
        }
    }

    /// Copy `chunk` into the buffer and forward it. A write before any
    /// status implies 200.
    pub fn write(&mut self, chunk: &[u8]) {
        if self.status.is_none() {
            self.set_status(StatusCode::OK);
        }
        self.body.extend_from_slice(chunk);
        self.inner.write_body(chunk);
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn into_parts(self) -> (S, StatusCode, Vec<u8>) {
        let status = self.status();
        (self.inner, status, self.body)
    }
}

/// Signals the paired receiver when dropped.
///
/// Travels with the outbound body, so the receiver resolves once the server
/// has finished with the body: fully written or abandoned by the client.
pub struct DeliveryGuard {
    tx: Option<oneshot::Sender<()>>,
}

impl DeliveryGuard {
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, rx)
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

/// The response headed for the client, reassembled from captured chunks.
pub struct OutboundResponse {
    parts: Parts,
    chunks: Vec<Bytes>,
}

impl OutboundResponse {
    pub fn new(parts: Parts) -> Self {
        Self {
            parts,
            chunks: Vec::new(),
        }
    }

    /// Build the client response. `guard` is dropped together with the body.
    pub fn into_response(self, guard: DeliveryGuard) -> Response {
        let body = stream::iter(self.chunks).map(move |chunk| {
            let _guard = &guard;
            Ok::<Bytes, Infallible>(chunk)
        });
        Response::from_parts(self.parts, Body::from_stream(body))
    }
}

impl ResponseSink for OutboundResponse {
    fn write_status(&mut self, status: StatusCode) {
        self.parts.status = status;
    }

    fn write_body(&mut self, chunk: &[u8]) {
        self.chunks.push(Bytes::copy_from_slice(chunk));
    }
}
