//! Subjects (mata pelajaran), each tied to a teacher and a class.

pub mod handlers;
pub mod repository;
pub mod service;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use repository::SqlMapelRepository;
pub use service::MapelService;

#[derive(Debug, Clone, Serialize)]
pub struct MataPelajaran {
    pub id: String,
    #[serde(rename = "mata_pelajaran")]
    pub nama_pelajaran: String,
    pub id_guru: Option<String>,
    /// Teacher display name
    pub guru: Option<String>,
    pub kelas_id: Option<String>,
    pub nama_kelas: Option<String>,
    pub deskripsi: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MapelInput {
    #[serde(rename = "mata_pelajaran", alias = "nama_pelajaran")]
    pub nama_pelajaran: String,
    pub id_guru: String,
    pub guru: String,
    pub kelas_id: String,
    pub nama_kelas: String,
    pub deskripsi: String,
}

#[async_trait]
pub trait MapelRepository: Send + Sync {
    async fn select_all(&self) -> Result<Vec<MataPelajaran>, AppError>;
    async fn select_by_id(&self, id: &str) -> Result<Option<MataPelajaran>, AppError>;
    async fn insert(&self, mapel: &MataPelajaran) -> Result<(), AppError>;
    async fn update(&self, mapel: &MataPelajaran) -> Result<bool, AppError>;
    async fn soft_delete(&self, id: &str) -> Result<bool, AppError>;
}
