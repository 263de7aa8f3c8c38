use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use super::{Kelas, KelasInput, KelasService};
use crate::api::extract::{JsonOrForm, RequiredId};
use crate::api::response::ApiResponse;
use crate::error::AppError;

pub async fn list_kelas(
    State(service): State<Arc<KelasService>>,
) -> Result<ApiResponse<Vec<Kelas>>, AppError> {
    Ok(ApiResponse::ok("success get kelas", service.list().await?))
}

pub async fn insert_kelas(
    State(service): State<Arc<KelasService>>,
    JsonOrForm(input): JsonOrForm<KelasInput>,
) -> Result<ApiResponse<Kelas>, AppError> {
    let kelas = service.insert(input).await?;
    Ok(ApiResponse::created("success insert kelas", kelas))
}

pub async fn kelas_by_id(
    State(service): State<Arc<KelasService>>,
    RequiredId(id): RequiredId,
) -> Result<ApiResponse<Kelas>, AppError> {
    Ok(ApiResponse::ok("success get kelas", service.get(&id).await?))
}

pub async fn update_kelas(
    State(service): State<Arc<KelasService>>,
    RequiredId(id): RequiredId,
    JsonOrForm(input): JsonOrForm<KelasInput>,
) -> Result<ApiResponse<Kelas>, AppError> {
    let kelas = service.update(&id, input).await?;
    Ok(ApiResponse::ok("success update kelas", kelas))
}

pub async fn delete_kelas(
    State(service): State<Arc<KelasService>>,
    RequiredId(id): RequiredId,
) -> Result<ApiResponse<()>, AppError> {
    service.delete(&id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "success delete kelas"))
}
