//! Audit Log Record
//!
//! One row per inbound request, built after the response is complete.

use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditResult {
    Success,
    Failed,
}

impl AuditResult {
    pub fn from_status(status: StatusCode) -> Self {
        if status.as_u16() >= 400 {
            AuditResult::Failed
        } else {
            AuditResult::Success
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditResult::Success => "Success",
            AuditResult::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for AuditResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuditResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Success" => Ok(AuditResult::Success),
            "Failed" => Ok(AuditResult::Failed),
            _ => Err(format!("Invalid audit result: {}", s)),
        }
    }
}

/// Persisted request/response pair. `id` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
    pub device: String,
    pub service_name: String,
    pub request_body: Value,
    pub response_body: Value,
    pub request_params: Value,
    pub result: AuditResult,
    pub headers: Value,
}

/// The last two non-empty path segments joined by `/`, the only segment when
/// there is one, or an empty string.
pub fn service_name_from_path(path: &str) -> String {
    let path = path.split('?').next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [.., parent, last] => format!("{}/{}", parent, last),
    }
}

/// Bytes as a JSON value: parsed when valid JSON, a JSON string otherwise,
/// `{}` when empty.
pub fn body_to_json(body: &[u8]) -> Value {
    if body.is_empty() {
        return json!({});
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Query string as `{name: [values...]}`.
pub fn query_to_json(query: Option<&str>) -> Value {
    let pairs: Vec<(String, String)> = query
        .and_then(|q| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default();

    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in pairs {
        params.entry(key).or_default().push(value);
    }
    json!(params)
}

/// Headers as `{name: [values...]}`.
pub fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for name in headers.keys() {
        let values: Vec<Value> = headers
            .get_all(name)
            .iter()
            .map(|v| Value::String(String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        map.insert(name.as_str().to_string(), Value::Array(values));
    }
    Value::Object(map)
}
