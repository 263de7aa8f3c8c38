//! Accounts: registration and profile management.

pub mod handlers;
pub mod repository;
pub mod service;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use repository::SqlUserRepository;
pub use service::UserService;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub updated_at: DateTime<Utc>,
}

/// Registration and update payload. Empty fields on update keep the stored
/// value.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UserInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn select_all(&self) -> Result<Vec<User>, AppError>;
    async fn select_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn select_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn insert(&self, user: &User) -> Result<(), AppError>;
    /// Returns `false` when no live row has this id.
    async fn update(&self, user: &User) -> Result<bool, AppError>;
    async fn soft_delete(&self, id: &str) -> Result<bool, AppError>;
}
