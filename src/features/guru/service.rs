use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Guru, GuruInput, GuruRepository};
use crate::audit::UserDirectory;
use crate::error::AppError;
use crate::features::keep_or_replace;
use crate::validation::{require_fields, require_valid_email};

pub struct GuruService {
    repo: Arc<dyn GuruRepository>,
    users: Arc<dyn UserDirectory>,
}

impl GuruService {
    pub fn new(repo: Arc<dyn GuruRepository>, users: Arc<dyn UserDirectory>) -> Self {
        Self { repo, users }
    }

    pub async fn list(&self) -> Result<Vec<Guru>, AppError> {
        self.repo.select_all().await
    }

    pub async fn get(&self, id: &str) -> Result<Guru, AppError> {
        self.repo
            .select_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("guru", id))
    }

    pub async fn insert(&self, input: GuruInput) -> Result<Guru, AppError> {
        require_fields(&[
            ("nama", input.nama.as_str()),
            ("email", input.email.as_str()),
            ("alamat", input.alamat.as_str()),
        ])?;
        let email = input.email.trim().to_string();
        require_valid_email(&email)?;

        let guru = Guru {
            id: Uuid::new_v4().to_string(),
            id_user: self.linked_user(&email).await?,
            nama: input.nama.trim().to_string(),
            email,
            alamat: input.alamat.trim().to_string(),
            updated_at: Utc::now(),
        };

        self.repo.insert(&guru).await?;
        info!("Inserted guru {} ({})", guru.id, guru.nama);
        Ok(guru)
    }

    pub async fn update(&self, id: &str, input: GuruInput) -> Result<Guru, AppError> {
        let mut guru = self.get(id).await?;

        keep_or_replace(&mut guru.nama, &input.nama);
        keep_or_replace(&mut guru.alamat, &input.alamat);
        let email = input.email.trim();
        if !email.is_empty() && email != guru.email {
            require_valid_email(email)?;
            guru.email = email.to_string();
            guru.id_user = self.linked_user(email).await?;
        }
        guru.updated_at = Utc::now();

        if !self.repo.update(&guru).await? {
            return Err(AppError::not_found("guru", id));
        }
        Ok(guru)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.repo.soft_delete(id).await? {
            return Err(AppError::not_found("guru", id));
        }
        info!("Soft-deleted guru {}", id);
        Ok(())
    }

    async fn linked_user(&self, email: &str) -> Result<Option<String>, AppError> {
        let user_id = self.users.find_id_by_email(email).await?;
        if user_id.is_none() {
            debug!("No account for guru email {}", email);
        }
        Ok(user_id)
    }
}
