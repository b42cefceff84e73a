use axum::{
    Router,
    http::Uri,
    routing::get,
};

use crate::{AppState, error::AppError, middleware::log_requests, routes};

// 消息相关的路由
pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/messages",
            get(routes::message::get_messages).post(routes::message::create_message),
        )
        .route(
            "/messages/get/broad/{lat}/{lon}",
            get(routes::message::quantize_coordinates),
        )
}

// 用户相关的路由
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(routes::user::get_users)
                .post(routes::user::create_user)
                .put(routes::user::update_location),
        )
        .route(
            "/users/get/specificRange/{lat}/{lon}",
            get(routes::user::nearby_users),
        )
}

async fn index() -> &'static str {
    "geodrop backend is running"
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Path could not be found: {}", uri.path()))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .merge(message_routes())
        .merge(user_routes())
        .fallback(not_found)
        .layer(axum::middleware::from_fn(log_requests))
        .with_state(state)
}
