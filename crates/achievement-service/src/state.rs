//! 应用状态定义

use crate::service::{BadgeQueryService, EvaluationDispatcher};

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub query_service: BadgeQueryService,
    pub dispatcher: EvaluationDispatcher,
}

impl AppState {
    pub fn new(query_service: BadgeQueryService, dispatcher: EvaluationDispatcher) -> Self {
        Self {
            query_service,
            dispatcher,
        }
    }
}
