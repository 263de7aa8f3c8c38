use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::api::response::ApiResponse;
use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::validation::ResolveError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    ReferenceError(ResolveError),

    #[error("{0}")]
    MalformedInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::ValidationError(_) | Self::MalformedInput(_) => StatusCode::BAD_REQUEST,
            Self::ReferenceError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ConfigError(_) | Self::DatabaseError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return Self::Conflict("A record with the same unique value already exists".to_string());
            }
            if db_err.is_foreign_key_violation() {
                return Self::Conflict("Referenced record no longer exists".to_string());
            }
        }
        Self::DatabaseError(err.to_string())
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Lookup { .. } => Self::DatabaseError(err.to_string()),
            other => Self::ReferenceError(other),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        // Server-side details stay in the operator log
        let message = match &self {
            Self::DatabaseError(_) | Self::Internal(_) | Self::ConfigError(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        ApiResponse::<()>::error(status, message).into_response()
    }
}
