//! Email/password login issuing bearer tokens.

pub mod handlers;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{AuthError, PasswordHasher, TokenIssuer};
use crate::error::AppError;
use crate::features::users::UserRepository;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub token: String,
    pub expiration: DateTime<Utc>,
}

pub struct LoginService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
}

impl LoginService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher, issuer: TokenIssuer) -> Self {
        Self {
            users,
            hasher,
            issuer,
        }
    }

    /// Unknown email and wrong password fail the same way.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let email = request.email.trim();
        let user = match self.users.select_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown email {}", email);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self
            .hasher
            .verify_blocking(request.password, user.password.clone())
            .await
        {
            warn!("Wrong password for {}", email);
            return Err(AuthError::InvalidCredentials.into());
        }

        let issued = self
            .issuer
            .issue(&user.id)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))?;

        info!("User {} logged in", user.id);
        Ok(LoginResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            token: issued.token,
            expiration: issued.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenVerifier;
    use crate::database::Database;
    use crate::features::users::{SqlUserRepository, UserInput, UserService};

    const SECRET: &str = "login-secret";

    async fn setup() -> LoginService {
        let db = Database::new_in_memory().await.unwrap();
        let repo: Arc<dyn UserRepository> = Arc::new(SqlUserRepository::new(db.pool().clone()));
        let hasher = PasswordHasher::new(4);

        UserService::new(Arc::clone(&repo), hasher)
            .register(UserInput {
                username: "budi".to_string(),
                email: "budi@sekolah.id".to_string(),
                password: "rahasia".to_string(),
                role: "guru".to_string(),
            })
            .await
            .unwrap();

        let issuer = TokenIssuer::from_secret(SECRET, chrono::Duration::hours(1)).unwrap();
        LoginService::new(repo, hasher, issuer)
    }

    fn request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let service = setup().await;
        let response = service.login(request("budi@sekolah.id", "rahasia")).await.unwrap();

        let claims = TokenVerifier::from_secret(SECRET)
            .unwrap()
            .verify(&response.token)
            .unwrap();
        assert_eq!(claims.subject_id, response.id);
        assert_eq!(response.username, "budi");
        assert!(response.expiration > Utc::now());
    }

    #[tokio::test]
    async fn test_bad_credentials_rejected() {
        let service = setup().await;

        for (email, password) in [("budi@sekolah.id", "salah"), ("siapa@sekolah.id", "rahasia")] {
            let err = service.login(request(email, password)).await.unwrap_err();
            assert!(matches!(err, AppError::Unauthorized(AuthError::InvalidCredentials)));
        }
    }
}
