use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::result::{ApiResult, error_codes};
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(msg) => AppError::Validation(msg),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, error_codes::USER_EXISTS, msg),
            // 5xx 由 log_errors 统一记录，这里只负责带上原因
            AppError::StoreUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                error_codes::STORE_UNAVAILABLE,
                format!("database unavailable: {}", msg),
            ),
        };

        let body = Json(ApiResult::<()>::error(code, &error_message));

        (status, body).into_response()
    }
}
