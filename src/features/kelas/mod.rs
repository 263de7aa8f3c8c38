//! Classes, each optionally led by a teacher.

pub mod handlers;
pub mod repository;
pub mod service;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use repository::SqlKelasRepository;
pub use service::KelasService;

#[derive(Debug, Clone, Serialize)]
pub struct Kelas {
    pub id: String,
    pub kelas: String,
    pub id_guru: Option<String>,
    /// Read through a join; never stored on the row.
    pub nama_guru: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// The teacher may be given by `id_guru`, `nama_guru`, or both.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct KelasInput {
    pub kelas: String,
    pub id_guru: String,
    pub nama_guru: String,
}

#[async_trait]
pub trait KelasRepository: Send + Sync {
    async fn select_all(&self) -> Result<Vec<Kelas>, AppError>;
    async fn select_by_id(&self, id: &str) -> Result<Option<Kelas>, AppError>;
    async fn insert(&self, kelas: &Kelas) -> Result<(), AppError>;
    async fn update(&self, kelas: &Kelas) -> Result<bool, AppError>;
    async fn soft_delete(&self, id: &str) -> Result<bool, AppError>;
}
