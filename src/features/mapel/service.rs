use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{MapelInput, MapelRepository, MataPelajaran};
use crate::error::AppError;
use crate::features::{keep_or_replace, non_empty, wants_reference};
use crate::validation::{require_fields, resolve_reference, ReferenceLookup};

pub struct MapelService {
    repo: Arc<dyn MapelRepository>,
    guru: Arc<dyn ReferenceLookup>,
    kelas: Arc<dyn ReferenceLookup>,
}

impl MapelService {
    pub fn new(
        repo: Arc<dyn MapelRepository>,
        guru: Arc<dyn ReferenceLookup>,
        kelas: Arc<dyn ReferenceLookup>,
    ) -> Self {
        Self { repo, guru, kelas }
    }

    pub async fn list(&self) -> Result<Vec<MataPelajaran>, AppError> {
        self.repo.select_all().await
    }

    pub async fn get(&self, id: &str) -> Result<MataPelajaran, AppError> {
        self.repo
            .select_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("mata pelajaran", id))
    }

    pub async fn insert(&self, mut input: MapelInput) -> Result<MataPelajaran, AppError> {
        require_fields(&[("mata_pelajaran", input.nama_pelajaran.as_str())])?;
        resolve_reference(self.guru.as_ref(), &mut input.id_guru, &mut input.guru).await?;
        resolve_reference(self.kelas.as_ref(), &mut input.kelas_id, &mut input.nama_kelas).await?;

        let mapel = MataPelajaran {
            id: Uuid::new_v4().to_string(),
            nama_pelajaran: input.nama_pelajaran.trim().to_string(),
            id_guru: non_empty(input.id_guru),
            guru: non_empty(input.guru),
            kelas_id: non_empty(input.kelas_id),
            nama_kelas: non_empty(input.nama_kelas),
            deskripsi: input.deskripsi.trim().to_string(),
            updated_at: Utc::now(),
        };

        self.repo.insert(&mapel).await?;
        info!("Inserted mata pelajaran {} ({})", mapel.id, mapel.nama_pelajaran);
        Ok(mapel)
    }

    pub async fn update(&self, id: &str, mut input: MapelInput) -> Result<MataPelajaran, AppError> {
        let mut mapel = self.get(id).await?;

        keep_or_replace(&mut mapel.nama_pelajaran, &input.nama_pelajaran);
        keep_or_replace(&mut mapel.deskripsi, &input.deskripsi);
        if wants_reference(&input.id_guru, &input.guru) {
            resolve_reference(self.guru.as_ref(), &mut input.id_guru, &mut input.guru).await?;
            mapel.id_guru = non_empty(input.id_guru);
            mapel.guru = non_empty(input.guru);
        }
        if wants_reference(&input.kelas_id, &input.nama_kelas) {
            resolve_reference(self.kelas.as_ref(), &mut input.kelas_id, &mut input.nama_kelas)
                .await?;
            mapel.kelas_id = non_empty(input.kelas_id);
            mapel.nama_kelas = non_empty(input.nama_kelas);
        }
        mapel.updated_at = Utc::now();

        if !self.repo.update(&mapel).await? {
            return Err(AppError::not_found("mata pelajaran", id));
        }
        Ok(mapel)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.repo.soft_delete(id).await? {
            return Err(AppError::not_found("mata pelajaran", id));
        }
        info!("Soft-deleted mata pelajaran {}", id);
        Ok(())
    }
}
