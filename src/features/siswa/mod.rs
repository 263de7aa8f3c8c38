//! Students

pub mod handlers;
pub mod repository;
pub mod service;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use repository::SqlSiswaRepository;
pub use service::SiswaService;

#[derive(Debug, Clone, Serialize)]
pub struct Siswa {
    pub id: String,
    pub nama: String,
    pub kelas_id: Option<String>,
    pub nama_kelas: Option<String>,
    pub email: String,
    pub alamat: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct SiswaInput {
    pub nama: String,
    pub kelas_id: String,
    pub nama_kelas: String,
    pub email: String,
    pub alamat: String,
}

#[async_trait]
pub trait SiswaRepository: Send + Sync {
    async fn select_all(&self) -> Result<Vec<Siswa>, AppError>;
    async fn select_by_id(&self, id: &str) -> Result<Option<Siswa>, AppError>;
    async fn insert(&self, siswa: &Siswa) -> Result<(), AppError>;
    async fn update(&self, siswa: &Siswa) -> Result<bool, AppError>;
    async fn soft_delete(&self, id: &str) -> Result<bool, AppError>;
}
