//! 活动事件接入
//!
//! 供独立部署的业务模块在提交写操作后通知评估

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;

use crate::{
    error::{AchievementError, Result},
    service::ActivityEvent,
    state::AppState,
};

/// 接收活动事件
///
/// POST /internal/activity
///
/// 事件格式错误返回 400；评估结果不影响响应，始终返回 202
pub async fn submit_activity(
    State(state): State<AppState>,
    event: std::result::Result<Json<ActivityEvent>, JsonRejection>,
) -> Result<StatusCode> {
    let Json(event) = event.map_err(|e| {
        AchievementError::Validation(format!("无效的活动事件: {}", e.body_text()))
    })?;
    info!(
        event = event.kind(),
        user_id = event.affected_user(),
        "收到活动通知"
    );
    state.dispatcher.notify(event).await;
    Ok(StatusCode::ACCEPTED)
}
