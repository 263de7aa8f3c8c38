//! Redaction of credentials in captured request bodies.

use serde_json::{Map, Value};
use tracing::warn;

use crate::auth::PasswordHasher;

pub const MASK_MARKER: &str = "***MASKED***";

const SENSITIVE_FIELDS: [&str; 3] = ["password", "access_token", "refresh_token"];

#[derive(Debug, Clone, Copy, Default)]
pub struct SensitiveDataMasker {
    hasher: PasswordHasher,
}

impl SensitiveDataMasker {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self { hasher }
    }

    /// Replace sensitive top-level string fields of a JSON object.
    ///
    /// `password` becomes its bcrypt hash, token fields become
    /// [`MASK_MARKER`]. Input that is not a JSON object is returned as-is.
    pub fn mask(&self, raw: &[u8]) -> Vec<u8> {
        let mut body: Map<String, Value> = match serde_json::from_slice(raw) {
            Ok(body) => body,
            Err(_) => return raw.to_vec(),
        };

        for field in SENSITIVE_FIELDS {
            let replacement = match body.get(field) {
                Some(Value::String(plain)) if field == "password" => self.hash_or_mask(plain),
                Some(Value::String(_)) => MASK_MARKER.to_string(),
                _ => continue,
            };
            body.insert(field.to_string(), Value::String(replacement));
        }

        serde_json::to_vec(&body).unwrap_or_else(|_| raw.to_vec())
    }

    fn hash_or_mask(&self, plain: &str) -> String {
        match self.hasher.hash(plain) {
            Ok(hash) => hash,
            Err(err) => {
                warn!("Could not hash password for audit log, masking instead: {}", err);
                MASK_MARKER.to_string()
            }
        }
    }
}
