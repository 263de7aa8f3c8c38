use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{Siswa, SiswaRepository};
use crate::error::AppError;

#[derive(Clone)]
pub struct SqlSiswaRepository {
    pool: SqlitePool,
}

impl SqlSiswaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_SISWA: &str = r#"
    SELECT s.id, s.nama, s.kelas_id, k.kelas AS nama_kelas, s.email, s.alamat, s.updated_at
    FROM siswa s
    LEFT JOIN kelas k ON k.id = s.kelas_id AND k.deleted_at IS NULL
    WHERE s.deleted_at IS NULL
"#;

fn siswa_from_row(row: &SqliteRow) -> Result<Siswa, sqlx::Error> {
    Ok(Siswa {
        id: row.try_get("id")?,
        nama: row.try_get("nama")?,
        kelas_id: row.try_get("kelas_id")?,
        nama_kelas: row.try_get("nama_kelas")?,
        email: row.try_get("email")?,
        alamat: row.try_get("alamat")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl SiswaRepository for SqlSiswaRepository {
    async fn select_all(&self) -> Result<Vec<Siswa>, AppError> {
        let rows = sqlx::query(&format!("{} ORDER BY s.nama", SELECT_SISWA))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(siswa_from_row).collect::<Result<Vec<_>, sqlx::Error>>()?)
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<Siswa>, AppError> {
        let row = sqlx::query(&format!("{} AND s.id = ?", SELECT_SISWA))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(siswa_from_row).transpose()?)
    }

    async fn insert(&self, siswa: &Siswa) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO siswa (id, kelas_id, nama, email, alamat, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&siswa.id)
        .bind(&siswa.kelas_id)
        .bind(&siswa.nama)
        .bind(&siswa.email)
        .bind(&siswa.alamat)
        .bind(siswa.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, siswa: &Siswa) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE siswa SET kelas_id = ?, nama = ?, email = ?, alamat = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&siswa.kelas_id)
        .bind(&siswa.nama)
        .bind(&siswa.email)
        .bind(&siswa.alamat)
        .bind(siswa.updated_at)
        .bind(&siswa.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE siswa SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
