use axum::{Json, extract::State};

use crate::{AppState, error::AppError, models::Employee, result::ApiResult};

/// 员工列表，不使用缓存
#[axum::debug_handler]
pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<Json<ApiResult<Vec<Employee>>>, AppError> {
    let employees = state.employees.list().await?;
    Ok(Json(ApiResult::success(employees)))
}
