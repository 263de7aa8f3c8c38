use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use super::{Guru, GuruInput, GuruService};
use crate::api::extract::{JsonOrForm, RequiredId};
use crate::api::response::ApiResponse;
use crate::error::AppError;

pub async fn list_guru(
    State(service): State<Arc<GuruService>>,
) -> Result<ApiResponse<Vec<Guru>>, AppError> {
    Ok(ApiResponse::ok("success get guru", service.list().await?))
}

pub async fn insert_guru(
    State(service): State<Arc<GuruService>>,
    JsonOrForm(input): JsonOrForm<GuruInput>,
) -> Result<ApiResponse<Guru>, AppError> {
    let guru = service.insert(input).await?;
    Ok(ApiResponse::created("success insert guru", guru))
}

pub async fn guru_by_id(
    State(service): State<Arc<GuruService>>,
    RequiredId(id): RequiredId,
) -> Result<ApiResponse<Guru>, AppError> {
    Ok(ApiResponse::ok("success get guru", service.get(&id).await?))
}

pub async fn update_guru(
    State(service): State<Arc<GuruService>>,
    RequiredId(id): RequiredId,
    JsonOrForm(input): JsonOrForm<GuruInput>,
) -> Result<ApiResponse<Guru>, AppError> {
    let guru = service.update(&id, input).await?;
    Ok(ApiResponse::ok("success update guru", guru))
}

pub async fn delete_guru(
    State(service): State<Arc<GuruService>>,
    RequiredId(id): RequiredId,
) -> Result<ApiResponse<()>, AppError> {
    service.delete(&id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "success delete guru"))
}
