use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{Siswa, SiswaInput, SiswaRepository};
use crate::error::AppError;
use crate::features::{keep_or_replace, non_empty, wants_reference};
use crate::validation::{require_fields, require_valid_email, resolve_reference, ReferenceLookup};

pub struct SiswaService {
    repo: Arc<dyn SiswaRepository>,
    kelas: Arc<dyn ReferenceLookup>,
}

impl SiswaService {
    pub fn new(repo: Arc<dyn SiswaRepository>, kelas: Arc<dyn ReferenceLookup>) -> Self {
        Self { repo, kelas }
    }

    pub async fn list(&self) -> Result<Vec<Siswa>, AppError> {
        self.repo.select_all().await
    }

    pub async fn get(&self, id: &str) -> Result<Siswa, AppError> {
        self.repo
            .select_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("siswa", id))
    }

    pub async fn insert(&self, mut input: SiswaInput) -> Result<Siswa, AppError> {
        require_fields(&[
            ("nama", input.nama.as_str()),
            ("alamat", input.alamat.as_str()),
            ("email", input.email.as_str()),
        ])?;
        let email = input.email.trim().to_string();
        require_valid_email(&email)?;
        resolve_reference(self.kelas.as_ref(), &mut input.kelas_id, &mut input.nama_kelas).await?;

        let siswa = Siswa {
            id: Uuid::new_v4().to_string(),
            nama: input.nama.trim().to_string(),
            kelas_id: non_empty(input.kelas_id),
            nama_kelas: non_empty(input.nama_kelas),
            email,
            alamat: input.alamat.trim().to_string(),
            updated_at: Utc::now(),
        };

        self.repo.insert(&siswa).await?;
        info!("Inserted siswa {} ({})", siswa.id, siswa.nama);
        Ok(siswa)
    }

    pub async fn update(&self, id: &str, mut input: SiswaInput) -> Result<Siswa, AppError> {
        let mut siswa = self.get(id).await?;

        keep_or_replace(&mut siswa.nama, &input.nama);
        keep_or_replace(&mut siswa.alamat, &input.alamat);
        if !input.email.trim().is_empty() {
            require_valid_email(input.email.trim())?;
            siswa.email = input.email.trim().to_string();
        }
        if wants_reference(&input.kelas_id, &input.nama_kelas) {
            resolve_reference(self.kelas.as_ref(), &mut input.kelas_id, &mut input.nama_kelas)
                .await?;
            siswa.kelas_id = non_empty(input.kelas_id);
            siswa.nama_kelas = non_empty(input.nama_kelas);
        }
        siswa.updated_at = Utc::now();

        if !self.repo.update(&siswa).await? {
            return Err(AppError::not_found("siswa", id));
        }
        Ok(siswa)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.repo.soft_delete(id).await? {
            return Err(AppError::not_found("siswa", id));
        }
        info!("Soft-deleted siswa {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::features::kelas::{KelasInput, KelasService, SqlKelasRepository};
    use crate::features::siswa::SqlSiswaRepository;
    use crate::validation::{ResolveError, SqlReferenceTable};

    async fn setup() -> (SiswaService, KelasService) {
        let db = Database::new_in_memory().await.unwrap();
        let pool = db.pool().clone();
        (
            SiswaService::new(
                Arc::new(SqlSiswaRepository::new(pool.clone())),
                Arc::new(SqlReferenceTable::kelas(pool.clone())),
            ),
            KelasService::new(
                Arc::new(SqlKelasRepository::new(pool.clone())),
                Arc::new(SqlReferenceTable::guru(pool)),
            ),
        )
    }

    fn input(kelas_id: &str, nama_kelas: &str) -> SiswaInput {
        SiswaInput {
            nama: "Budi".to_string(),
            kelas_id: kelas_id.to_string(),
            nama_kelas: nama_kelas.to_string(),
            email: "budi@sekolah.id".to_string(),
            alamat: "Jl. Melati".to_string(),
        }
    }

    async fn kelas_a(kelas: &KelasService) -> String {
        kelas
            .insert(KelasInput {
                kelas: "Kelas A".to_string(),
                ..KelasInput::default()
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_class_resolved_from_either_side() {
        let (siswa, kelas) = setup().await;
        let kelas_id = kelas_a(&kelas).await;

        let by_name = siswa.insert(input("", "kelas a")).await.unwrap();
        let by_id = siswa.insert(input(&kelas_id, "")).await.unwrap();
        let by_both = siswa.insert(input(&kelas_id, "Kelas A")).await.unwrap();

        for s in [&by_name, &by_id, &by_both] {
            assert_eq!(s.kelas_id.as_deref(), Some(kelas_id.as_str()));
            assert_eq!(s.nama_kelas.as_deref(), Some("Kelas A"));
        }
        assert_eq!(siswa.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_mismatch_leaves_store_unchanged() {
        let (siswa, kelas) = setup().await;
        let kelas_id = kelas_a(&kelas).await;

        let err = siswa.insert(input(&kelas_id, "Wrong Name")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::ReferenceError(ResolveError::Mismatch { .. })
        ));
        assert!(siswa.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_class_rename_visible_on_read() {
        let (siswa, kelas) = setup().await;
        let kelas_id = kelas_a(&kelas).await;
        let student = siswa.insert(input(&kelas_id, "")).await.unwrap();

        kelas
            .update(
                &kelas_id,
                KelasInput {
                    kelas: "Kelas A Baru".to_string(),
                    ..KelasInput::default()
                },
            )
            .await
            .unwrap();

        let stored = siswa.get(&student.id).await.unwrap();
        assert_eq!(stored.nama_kelas.as_deref(), Some("Kelas A Baru"));
    }

    #[tokio::test]
    async fn test_invalid_email_rejected_before_lookup() {
        let (siswa, _) = setup().await;
        let mut bad = input("", "Missing Kelas");
        bad.email = "bukan-email".to_string();

        assert!(matches!(
            siswa.insert(bad).await,
            Err(AppError::ValidationError(_))
        ));
    }
}
