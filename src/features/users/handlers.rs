use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

use super::{User, UserInput, UserService};
use crate::api::extract::{JsonOrForm, RequiredId};
use crate::api::response::ApiResponse;
use crate::error::AppError;

pub async fn list_users(
    State(service): State<Arc<UserService>>,
) -> Result<ApiResponse<Vec<User>>, AppError> {
    let users = service.list().await?;
    Ok(ApiResponse::ok("success get users", users))
}

pub async fn register_user(
    State(service): State<Arc<UserService>>,
    JsonOrForm(input): JsonOrForm<UserInput>,
) -> Result<ApiResponse<User>, AppError> {
    let user = service.register(input).await?;
    Ok(ApiResponse::created("success insert user", user))
}

pub async fn user_by_id(
    State(service): State<Arc<UserService>>,
    RequiredId(id): RequiredId,
) -> Result<ApiResponse<User>, AppError> {
    let user = service.get(&id).await?;
    Ok(ApiResponse::ok("success get user", user))
}

pub async fn update_user(
    State(service): State<Arc<UserService>>,
    RequiredId(id): RequiredId,
    JsonOrForm(input): JsonOrForm<UserInput>,
) -> Result<ApiResponse<User>, AppError> {
    let user = service.update(&id, input).await?;
    Ok(ApiResponse::ok("success update user", user))
}

pub async fn delete_user(
    State(service): State<Arc<UserService>>,
    RequiredId(id): RequiredId,
) -> Result<ApiResponse<()>, AppError> {
    service.delete(&id).await?;
    Ok(ApiResponse::message(StatusCode::OK, "success delete user"))
}
