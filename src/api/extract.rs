//! Request extractors that reject with the JSON error envelope.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::CONTENT_TYPE, request::Parts},
    Form, Json,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::AppError;

/// Body decoded from JSON, or from a url-encoded form when the content type
/// says so.
#[derive(Debug)]
pub struct JsonOrForm<T>(pub T);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

#[async_trait]
impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::MalformedInput(e.body_text()))?;
            return Ok(Self(value));
        }

        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::MalformedInput(e.body_text()))?;
        Ok(Self(value))
    }
}

#[derive(Debug, Deserialize)]
struct IdQuery {
    #[serde(default)]
    id: String,
}

/// Non-empty `?id=` query parameter.
#[derive(Debug, Clone)]
pub struct RequiredId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequiredId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query: IdQuery = serde_urlencoded::from_str(parts.uri.query().unwrap_or_default())
            .map_err(|e| AppError::MalformedInput(format!("Invalid query string: {}", e)))?;

        let id = query.id.trim();
        if id.is_empty() {
            return Err(AppError::MalformedInput("Query parameter 'id' is required".to_string()));
        }
        Ok(Self(id.to_string()))
    }
}
