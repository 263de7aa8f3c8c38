use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{MapelRepository, MataPelajaran};
use crate::error::AppError;

#[derive(Clone)]
pub struct SqlMapelRepository {
    pool: SqlitePool,
}

impl SqlMapelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_MAPEL: &str = r#"
    SELECT m.id, m.nama_pelajaran, m.id_guru, g.nama AS guru, m.kelas_id,
           k.kelas AS nama_kelas, m.deskripsi, m.updated_at
    FROM mata_pelajaran m
    LEFT JOIN guru g ON g.id = m.id_guru AND g.deleted_at IS NULL
    LEFT JOIN kelas k ON k.id = m.kelas_id AND k.deleted_at IS NULL
    WHERE m.deleted_at IS NULL
"#;

fn mapel_from_row(row: &SqliteRow) -> Result<MataPelajaran, sqlx::Error> {
    Ok(MataPelajaran {
        id: row.try_get("id")?,
        nama_pelajaran: row.try_get("nama_pelajaran")?,
        id_guru: row.try_get("id_guru")?,
        guru: row.try_get("guru")?,
        kelas_id: row.try_get("kelas_id")?,
        nama_kelas: row.try_get("nama_kelas")?,
        deskripsi: row.try_get("deskripsi")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl MapelRepository for SqlMapelRepository {
    async fn select_all(&self) -> Result<Vec<MataPelajaran>, AppError> {
        let rows = sqlx::query(&format!("{} ORDER BY m.nama_pelajaran", SELECT_MAPEL))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(mapel_from_row).collect::<Result<Vec<_>, sqlx::Error>>()?)
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<MataPelajaran>, AppError> {
        let row = sqlx::query(&format!("{} AND m.id = ?", SELECT_MAPEL))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(mapel_from_row).transpose()?)
    }

    async fn insert(&self, mapel: &MataPelajaran) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO mata_pelajaran \
                (id, nama_pelajaran, id_guru, kelas_id, deskripsi, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&mapel.id)
        .bind(&mapel.nama_pelajaran)
        .bind(&mapel.id_guru)
        .bind(&mapel.kelas_id)
        .bind(&mapel.deskripsi)
        .bind(mapel.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, mapel: &MataPelajaran) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE mata_pelajaran \
             SET nama_pelajaran = ?, id_guru = ?, kelas_id = ?, deskripsi = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&mapel.nama_pelajaran)
        .bind(&mapel.id_guru)
        .bind(&mapel.kelas_id)
        .bind(&mapel.deskripsi)
        .bind(mapel.updated_at)
        .bind(&mapel.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE mata_pelajaran SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
