//! HS256 token issuance and verification.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ConfigError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization token required")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid email or password")]
    InvalidCredentials,
}

/// Decoded token payload. Serialized as `{"id": ..., "exp": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "id")]
    pub subject_id: String,
    #[serde(rename = "exp")]
    pub expiry: i64,
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The header must contain exactly two space-separated parts and the scheme
/// is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 || !parts[0].eq_ignore_ascii_case("bearer") || parts[1].is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(parts[1])
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.trim().is_empty() {
        return Err(ConfigError::MissingSecret);
    }
    Ok(())
}

#[derive(Clone)]
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_secret(secret: &str) -> Result<Self, ConfigError> {
        check_secret(secret)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                debug!("Token verification failed: {}", err);
                match err.kind() {
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::InvalidToken(err.to_string()),
                }
            })
    }

    /// Hard gate: the request must carry a valid bearer token.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = bearer_token(headers)?;
        self.verify(token)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn from_secret(secret: &str, ttl: Duration) -> Result<Self, ConfigError> {
        check_secret(secret)?;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    pub fn issue(&self, subject_id: &str) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let expires_at = Utc::now() + self.ttl;
        let claims = Claims {
            subject_id: subject_id.to_string(),
            expiry: expires_at.timestamp(),
        };

        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_at,
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }
}
