use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{AppState, middleware::log_errors, routes};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(routes::user::list_users).post(routes::user::create_user),
        )
        .route(
            "/users/",
            get(routes::user::list_users).post(routes::user::create_user),
        )
}

pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(routes::employee::list_employees))
        .route("/employees/", get(routes::employee::list_employees))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::status::root))
        .route("/status", get(routes::status::status))
        .merge(user_routes())
        .merge(employee_routes())
        .layer(axum::middleware::from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
