//! Teachers

pub mod handlers;
pub mod repository;
pub mod service;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use repository::SqlGuruRepository;
pub use service::GuruService;

#[derive(Debug, Clone, Serialize)]
pub struct Guru {
    pub id: String,
    /// Account owning the same email, when there is one.
    pub id_user: Option<String>,
    pub nama: String,
    pub email: String,
    pub alamat: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GuruInput {
    pub nama: String,
    pub email: String,
    pub alamat: String,
}

#[async_trait]
pub trait GuruRepository: Send + Sync {
    async fn select_all(&self) -> Result<Vec<Guru>, AppError>;
    async fn select_by_id(&self, id: &str) -> Result<Option<Guru>, AppError>;
    async fn insert(&self, guru: &Guru) -> Result<(), AppError>;
    async fn update(&self, guru: &Guru) -> Result<bool, AppError>;
    async fn soft_delete(&self, id: &str) -> Result<bool, AppError>;
}
