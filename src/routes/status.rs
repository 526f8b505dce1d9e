use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "Hello": "World",
        "app_status": "running",
        "message": "Connected to the cached users API."
    }))
}

/// 静态状态信息，不访问数据库和缓存
pub async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "app_status": "running",
        "database_connection_status": "Configured via DATABASE_URL",
        "users_cache_key": state.config.users_cache_key,
        "users_cache_ttl_secs": state.config.users_cache_ttl_secs,
        "message": "Users API with Postgres store and Redis cache."
    }))
}
