use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{Kelas, KelasInput, KelasRepository};
use crate::error::AppError;
use crate::features::{keep_or_replace, non_empty, wants_reference};
use crate::validation::{require_fields, resolve_reference, ReferenceLookup};

pub struct KelasService {
    repo: Arc<dyn KelasRepository>,
    guru: Arc<dyn ReferenceLookup>,
}

impl KelasService {
    pub fn new(repo: Arc<dyn KelasRepository>, guru: Arc<dyn ReferenceLookup>) -> Self {
        Self { repo, guru }
    }

    pub async fn list(&self) -> Result<Vec<Kelas>, AppError> {
        self.repo.select_all().await
    }

    pub async fn get(&self, id: &str) -> Result<Kelas, AppError> {
        self.repo
            .select_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("kelas", id))
    }

    pub async fn insert(&self, mut input: KelasInput) -> Result<Kelas, AppError> {
        require_fields(&[("kelas", input.kelas.as_str())])?;
        resolve_reference(self.guru.as_ref(), &mut input.id_guru, &mut input.nama_guru).await?;

        let kelas = Kelas {
            id: Uuid::new_v4().to_string(),
            kelas: input.kelas.trim().to_string(),
            id_guru: non_empty(input.id_guru),
            nama_guru: non_empty(input.nama_guru),
            updated_at: Utc::now(),
        };

        self.repo.insert(&kelas).await?;
        info!("Inserted kelas {} ({})", kelas.id, kelas.kelas);
        Ok(kelas)
    }

    pub async fn update(&self, id: &str, mut input: KelasInput) -> Result<Kelas, AppError> {
        let mut kelas = self.get(id).await?;

        keep_or_replace(&mut kelas.kelas, &input.kelas);
        if wants_reference(&input.id_guru, &input.nama_guru) {
            resolve_reference(self.guru.as_ref(), &mut input.id_guru, &mut input.nama_guru)
                .await?;
            kelas.id_guru = non_empty(input.id_guru);
            kelas.nama_guru = non_empty(input.nama_guru);
        }
        kelas.updated_at = Utc::now();

        if !self.repo.update(&kelas).await? {
            return Err(AppError::not_found("kelas", id));
        }
        Ok(kelas)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.repo.soft_delete(id).await? {
            return Err(AppError::not_found("kelas", id));
        }
        info!("Soft-deleted kelas {}", id);
        Ok(())
    }
}
