//! 路由配置

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

/// 徽章只读查询路由
pub fn badge_routes() -> Router<AppState> {
    Router::new()
        .route("/badges", get(handlers::badge::list_badges))
        .route("/badges/", get(handlers::badge::list_badges))
        .route(
            "/badges/users/{user_id}",
            get(handlers::badge::list_user_badges),
        )
}

/// 内部事件接入路由
pub fn internal_routes() -> Router<AppState> {
    Router::new().route("/activity", post(handlers::activity::submit_activity))
}

/// 构建完整路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", badge_routes())
        .nest("/internal", internal_routes())
        .route("/health", get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
