use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use super::{Siswa, SiswaInput, SiswaService};
use crate::api::extract::{JsonOrForm, RequiredId};
use crate::api::response::ApiResponse;
use crate::error::AppError;

pub async fn list_siswa(
    State(service): State<Arc<SiswaService>>,
) -> Result<ApiResponse<Vec<Siswa>>, AppError> {
    Ok(ApiResponse::ok("success get siswa", service.list().await?))
}

pub async fn insert_siswa(
    State(service): State<Arc<SiswaService>>,
    JsonOrForm(input): JsonOrForm<SiswaInput>,
) -> Result<ApiResponse<Siswa>, AppError> {
    let siswa = service.insert(input).await?;
    Ok(ApiResponse::created("success insert siswa", siswa))
}

pub async fn siswa_by_id(
    State(service): State<Arc<SiswaService>>,
    RequiredId(id): RequiredId,
) -> Result<ApiResponse<Siswa>, AppError> {
    Ok(ApiResponse::ok("success get siswa", service.get(&id).await?))
}

pub async fn update_siswa(
    State(service): State<Arc<SiswaService>>,
    RequiredId(id): RequiredId,
    JsonOrForm(input): JsonOrForm<SiswaInput>,
) -> Result<ApiResponse<Siswa>, AppError> {
    let siswa = service.update(&id, input).await?;
    Ok(ApiResponse::ok("success update siswa", siswa))
}

pub async fn delete_siswa(
    State(service): State<Arc<SiswaService>>,
    RequiredId(id): RequiredId,
) -> Result<ApiResponse<()>, AppError> {
    service.delete(&id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "success delete siswa"))
}
