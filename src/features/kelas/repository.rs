use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{Kelas, KelasRepository};
use crate::error::AppError;

#[derive(Clone)]
pub struct SqlKelasRepository {
    pool: SqlitePool,
}

impl SqlKelasRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_KELAS: &str = r#"
    SELECT k.id, k.kelas, k.id_guru, g.nama AS nama_guru, k.updated_at
    FROM kelas k
    LEFT JOIN guru g ON g.id = k.id_guru AND g.deleted_at IS NULL
    WHERE k.deleted_at IS NULL
"#;

fn kelas_from_row(row: &SqliteRow) -> Result<Kelas, sqlx::Error> {
    Ok(Kelas {
        id: row.try_get("id")?,
        kelas: row.try_get("kelas")?,
        id_guru: row.try_get("id_guru")?,
        nama_guru: row.try_get("nama_guru")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl KelasRepository for SqlKelasRepository {
    async fn select_all(&self) -> Result<Vec<Kelas>, AppError> {
        let rows = sqlx::query(&format!("{} ORDER BY k.kelas", SELECT_KELAS))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(kelas_from_row).collect::<Result<Vec<_>, sqlx::Error>>()?)
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<Kelas>, AppError> {
        let row = sqlx::query(&format!("{} AND k.id = ?", SELECT_KELAS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(kelas_from_row).transpose()?)
    }

    async fn insert(&self, kelas: &Kelas) -> Result<(), AppError> {
        sqlx::query("INSERT INTO kelas (id, kelas, id_guru, updated_at) VALUES (?, ?, ?, ?)")
            .bind(&kelas.id)
            .bind(&kelas.kelas)
            .bind(&kelas.id_guru)
            .bind(kelas.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(&self, kelas: &Kelas) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE kelas SET kelas = ?, id_guru = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&kelas.kelas)
        .bind(&kelas.id_guru)
        .bind(kelas.updated_at)
        .bind(&kelas.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE kelas SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
