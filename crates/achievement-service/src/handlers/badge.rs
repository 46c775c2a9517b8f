//! 徽章查询 API 处理器

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};

use crate::{
    error::{AchievementError, Result},
    service::{BadgeOut, UserBadgeOut},
    state::AppState,
};

/// 列出徽章目录
///
/// GET /api/badges
pub async fn list_badges(State(state): State<AppState>) -> Json<Vec<BadgeOut>> {
    Json(state.query_service.list_badges())
}

/// 列出用户已获得的徽章
///
/// GET /api/badges/users/{user_id}
pub async fn list_user_badges(
    State(state): State<AppState>,
    user_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<UserBadgeOut>>> {
    let Path(user_id) = user_id.map_err(|e| {
        AchievementError::Validation(format!("无效的用户 id: {}", e.body_text()))
    })?;
    let badges = state.query_service.list_user_badges(user_id).await?;
    Ok(Json(badges))
}
