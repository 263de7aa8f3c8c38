use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

use super::entry::{AuditRecord, AuditResult};
use crate::error::AppError;

/// Where finished audit records go.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Whether the sink can accept writes. Checked before each request is
    /// admitted.
    fn is_ready(&self) -> bool;

    async fn persist(&self, record: AuditRecord) -> Result<(), AppError>;
}

/// `transaction_logs` table
#[derive(Clone)]
pub struct AuditStore {
    pool: SqlitePool,
}

impl AuditStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recent records first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<AuditRecord>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, user_id, device, service_name, request_body,
                   response_body, request_params, result, headers
            FROM transaction_logs
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn json_column(row: &SqliteRow, column: &str) -> Result<Value, AppError> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::DatabaseError(format!("Corrupt {} column: {}", column, e)))
}

fn record_from_row(row: &SqliteRow) -> Result<AuditRecord, AppError> {
    let timestamp: DateTime<Utc> = row.try_get("timestamp")?;
    let result: String = row.try_get("result")?;

    Ok(AuditRecord {
        id: Some(row.try_get("id")?),
        timestamp,
        user_id: row.try_get("user_id")?,
        device: row.try_get("device")?,
        service_name: row.try_get("service_name")?,
        request_body: json_column(row, "request_body")?,
        response_body: json_column(row, "response_body")?,
        request_params: json_column(row, "request_params")?,
        result: result.parse::<AuditResult>().map_err(AppError::DatabaseError)?,
        headers: json_column(row, "headers")?,
    })
}

#[async_trait]
impl AuditSink for AuditStore {
    fn is_ready(&self) -> bool {
        !self.pool.is_closed()
    }

    async fn persist(&self, record: AuditRecord) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO transaction_logs
                (timestamp, user_id, device, service_name, request_body,
                 response_body, request_params, result, headers)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.timestamp)
        .bind(&record.user_id)
        .bind(&record.device)
        .bind(&record.service_name)
        .bind(record.request_body.to_string())
        .bind(record.response_body.to_string())
        .bind(record.request_params.to_string())
        .bind(record.result.as_str())
        .bind(record.headers.to_string())
        .execute(&self.pool)
        .await?;

        debug!(
            "Persisted audit record {} for {}",
            result.last_insert_rowid(),
            record.service_name
        );
        Ok(())
    }
}
