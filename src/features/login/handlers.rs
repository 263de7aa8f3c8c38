use axum::extract::State;
use std::sync::Arc;

use super::{LoginRequest, LoginResponse, LoginService};
use crate::api::extract::JsonOrForm;
use crate::api::response::ApiResponse;
use crate::error::AppError;

pub async fn login(
    State(service): State<Arc<LoginService>>,
    JsonOrForm(request): JsonOrForm<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let response = service.login(request).await?;
    Ok(ApiResponse::ok("success login", response))
}
