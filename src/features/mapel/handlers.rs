use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use super::{MapelInput, MapelService, MataPelajaran};
use crate::api::extract::{JsonOrForm, RequiredId};
use crate::api::response::ApiResponse;
use crate::error::AppError;

pub async fn list_mapel(
    State(service): State<Arc<MapelService>>,
) -> Result<ApiResponse<Vec<MataPelajaran>>, AppError> {
    Ok(ApiResponse::ok("success get mata pelajaran", service.list().await?))
}

pub async fn insert_mapel(
    State(service): State<Arc<MapelService>>,
    JsonOrForm(input): JsonOrForm<MapelInput>,
) -> Result<ApiResponse<MataPelajaran>, AppError> {
    let mapel = service.insert(input).await?;
    Ok(ApiResponse::created("success insert mata pelajaran", mapel))
}

pub async fn mapel_by_id(
    State(service): State<Arc<MapelService>>,
    RequiredId(id): RequiredId,
) -> Result<ApiResponse<MataPelajaran>, AppError> {
    Ok(ApiResponse::ok("success get mata pelajaran", service.get(&id).await?))
}

pub async fn update_mapel(
    State(service): State<Arc<MapelService>>,
    RequiredId(id): RequiredId,
    JsonOrForm(input): JsonOrForm<MapelInput>,
) -> Result<ApiResponse<MataPelajaran>, AppError> {
    let mapel = service.update(&id, input).await?;
    Ok(ApiResponse::ok("success update mata pelajaran", mapel))
}

pub async fn delete_mapel(
    State(service): State<Arc<MapelService>>,
    RequiredId(id): RequiredId,
) -> Result<ApiResponse<()>, AppError> {
    service.delete(&id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "success delete mata pelajaran"))
}
