use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{User, UserRepository};
use crate::audit::UserDirectory;
use crate::error::AppError;

#[derive(Clone)]
pub struct SqlUserRepository {
    pool: SqlitePool,
}

impl SqlUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_USER: &str =
    "SELECT id, username, email, password, role, updated_at FROM users WHERE deleted_at IS NULL";

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        role: row.try_get("role")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn select_all(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!("{} ORDER BY username", SELECT_USER))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(user_from_row).collect::<Result<Vec<_>, sqlx::Error>>()?)
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("{} AND id = ?", SELECT_USER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn select_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("{} AND email = ?", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password, role, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.role)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE users SET username = ?, email = ?, password = ?, role = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.role)
        .bind(user.updated_at)
        .bind(&user.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE users SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserDirectory for SqlUserRepository {
    async fn find_id_by_email(&self, email: &str) -> Result<Option<String>, AppError> {
        let id = sqlx::query_scalar("SELECT id FROM users WHERE email = ? AND deleted_at IS NULL")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }
}
