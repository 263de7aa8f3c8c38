use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{User, UserInput, UserRepository};
use crate::auth::PasswordHasher;
use crate::error::AppError;
use crate::features::keep_or_replace;
use crate::validation::{require_fields, require_valid_email};

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.repo.select_all().await
    }

    pub async fn get(&self, id: &str) -> Result<User, AppError> {
        self.repo
            .select_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user", id))
    }

    pub async fn register(&self, input: UserInput) -> Result<User, AppError> {
        require_fields(&[
            ("username", input.username.as_str()),
            ("email", input.email.as_str()),
            ("password", input.password.as_str()),
            ("role", input.role.as_str()),
        ])?;
        let email = input.email.trim().to_string();
        require_valid_email(&email)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: input.username.trim().to_string(),
            email,
            password: self.hasher.hash_blocking(input.password).await?,
            role: input.role.trim().to_string(),
            updated_at: Utc::now(),
        };

        self.repo.insert(&user).await?;
        info!("Registered user {} ({})", user.id, user.email);
        Ok(user)
    }

    pub async fn update(&self, id: &str, input: UserInput) -> Result<User, AppError> {
        let mut user = self.get(id).await?;

        keep_or_replace(&mut user.username, &input.username);
        keep_or_replace(&mut user.role, &input.role);
        if !input.email.trim().is_empty() {
            require_valid_email(input.email.trim())?;
            user.email = input.email.trim().to_string();
        }
        if !input.password.is_empty() {
            user.password = self.hasher.hash_blocking(input.password).await?;
        }
        user.updated_at = Utc::now();

        if !self.repo.update(&user).await? {
            return Err(AppError::not_found("user", id));
        }
        Ok(user)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.repo.soft_delete(id).await? {
            return Err(AppError::not_found("user", id));
        }
        info!("Soft-deleted user {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::features::users::SqlUserRepository;

    async fn service() -> UserService {
        let db = Database::new_in_memory().await.unwrap();
        UserService::new(
            Arc::new(SqlUserRepository::new(db.pool().clone())),
            PasswordHasher::new(4),
        )
    }

    fn input(email: &str, password: &str) -> UserInput {
        UserInput {
            username: "budi".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: "guru".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let service = service().await;
        let user = service.register(input("budi@sekolah.id", "rahasia")).await.unwrap();

        assert_ne!(user.password, "rahasia");
        assert!(bcrypt::verify("rahasia", &user.password).unwrap());
        assert_eq!(service.get(&user.id).await.unwrap().email, "budi@sekolah.id");
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = service().await;

        let err = service.register(input("", "")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: email, password must not be empty"
        );
        assert!(matches!(
            service.register(input("not-an-email", "x")).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_omitted_fields() {
        let service = service().await;
        let user = service.register(input("budi@sekolah.id", "rahasia")).await.unwrap();

        let updated = service
            .update(
                &user.id,
                UserInput {
                    role: "admin".to_string(),
                    ..UserInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, "admin");
        assert_eq!(updated.username, "budi");
        assert_eq!(updated.password, user.password);
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let service = service().await;
        let user = service.register(input("budi@sekolah.id", "rahasia")).await.unwrap();

        service.delete(&user.id).await.unwrap();
        assert!(matches!(service.get(&user.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(&user.id).await, Err(AppError::NotFound(_))));
    }
}
