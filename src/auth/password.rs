use crate::error::AppError;

/// bcrypt hashing with a configurable cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plain: &str) -> Result<String, bcrypt::BcryptError> {
        bcrypt::hash(plain, self.cost)
    }

    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        bcrypt::verify(plain, hash).unwrap_or(false)
    }

    /// Hash on the blocking pool so request workers are not stalled.
    pub async fn hash_blocking(&self, plain: String) -> Result<String, AppError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    pub async fn verify_blocking(&self, plain: String, hash: String) -> bool {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash("mypassword").unwrap();

        assert_ne!(hash, "mypassword");
        assert!(hasher.verify("mypassword", &hash));
        assert!(!hasher.verify("wrongpass", &hash));
    }

    #[test]
    fn test_verify_against_malformed_hash() {
        let hasher = PasswordHasher::new(4);
        assert!(!hasher.verify("mypassword", "not-a-bcrypt-hash"));
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash_blocking("secret".to_string()).await.unwrap();
        assert!(hasher.verify_blocking("secret".to_string(), hash).await);
    }
}
