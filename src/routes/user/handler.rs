use axum::{
    Json,
    extract::{Query, State},
};

use super::model::CreateUserRequest;
use crate::{AppState, error::AppError, models::User, result::ApiResult};

/// 用户列表，走读穿缓存
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResult<Vec<User>>>, AppError> {
    let users = state.users.list_cached().await?;
    Ok(Json(ApiResult::success(users)))
}

/// 创建用户，成功后删除列表快照
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Query(req): Query<CreateUserRequest>,
) -> Result<Json<ApiResult<User>>, AppError> {
    let name = req.name.unwrap_or_default();
    let email = req.email.unwrap_or_default();

    let created = state.users.create(&name, &email).await?;
    tracing::info!("Created user {}", created.user.id);

    let body = match created.invalidation {
        Ok(()) => ApiResult::success(created.user),
        // 用户已落库，仍返回成功，但要让调用方知道缓存可能是旧的
        Err(e) => ApiResult::success(created.user).with_warning(e.to_string()),
    };
    Ok(Json(body))
}
