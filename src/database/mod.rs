use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool described by the configuration. Connections are
    /// recycled after `db_max_lifetime_secs` and pinged before checkout so
    /// dead ones are evicted.
    pub async fn connect(config: &AppConfig) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.db_max_connections)
            .min_connections(config.db_min_connections)
            .max_lifetime(Duration::from_secs(config.db_max_lifetime_secs))
            .idle_timeout(Duration::from_secs(config.db_idle_timeout_secs))
            .acquire_timeout(Duration::from_secs(5))
            .test_before_acquire(true)
            .connect_with(options)
            .await?;

        info!(
            "Database pool ready (min {}, max {})",
            config.db_min_connections, config.db_max_connections
        );
        Ok(Database { pool })
    }

    /// Single-connection in-memory database with the schema applied.
    pub async fn new_in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // The database lives only as long as its one connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let database = Database { pool };
        database.run_migrations().await?;
        Ok(database)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(include_str!("../migrations/001_school_schema.sql"))
            .execute(&self.pool)
            .await?;

        sqlx::raw_sql(include_str!("../migrations/002_transaction_logs.sql"))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_has_schema() {
        let db = Database::new_in_memory().await.unwrap();
        assert!(db.ping().await);

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        for table in ["guru", "kelas", "mata_pelajaran", "siswa", "transaction_logs", "users"] {
            assert!(tables.iter().any(|t| t == table), "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new_in_memory().await.unwrap();
        assert!(db.run_migrations().await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_creates_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sekolah.db");
        let config = AppConfig {
            database_url: format!("sqlite://{}", path.display()),
            jwt_secret: "secret".to_string(),
            db_max_connections: 4,
            db_min_connections: 1,
            ..AppConfig::default()
        };

        let db = Database::connect(&config).await.unwrap();
        db.run_migrations().await.unwrap();
        assert!(db.ping().await);
        assert!(path.exists());
        db.close().await;
    }
}
