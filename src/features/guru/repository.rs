use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{Guru, GuruRepository};
use crate::error::AppError;

#[derive(Clone)]
pub struct SqlGuruRepository {
    pool: SqlitePool,
}

impl SqlGuruRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_GURU: &str =
    "SELECT id, id_user, nama, email, alamat, updated_at FROM guru WHERE deleted_at IS NULL";

fn guru_from_row(row: &SqliteRow) -> Result<Guru, sqlx::Error> {
    Ok(Guru {
        id: row.try_get("id")?,
        id_user: row.try_get("id_user")?,
        nama: row.try_get("nama")?,
        email: row.try_get("email")?,
        alamat: row.try_get("alamat")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl GuruRepository for SqlGuruRepository {
    async fn select_all(&self) -> Result<Vec<Guru>, AppError> {
        let rows = sqlx::query(&format!("{} ORDER BY nama", SELECT_GURU))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(guru_from_row).collect::<Result<Vec<_>, sqlx::Error>>()?)
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<Guru>, AppError> {
        let row = sqlx::query(&format!("{} AND id = ?", SELECT_GURU))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(guru_from_row).transpose()?)
    }

    async fn insert(&self, guru: &Guru) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO guru (id, id_user, nama, email, alamat, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&guru.id)
        .bind(&guru.id_user)
        .bind(&guru.nama)
        .bind(&guru.email)
        .bind(&guru.alamat)
        .bind(guru.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, guru: &Guru) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE guru SET id_user = ?, nama = ?, email = ?, alamat = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&guru.id_user)
        .bind(&guru.nama)
        .bind(&guru.email)
        .bind(&guru.alamat)
        .bind(guru.updated_at)
        .bind(&guru.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE guru SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
