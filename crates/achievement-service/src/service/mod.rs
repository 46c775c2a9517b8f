//! 服务层
//!
//! - `evaluator`: 徽章评估
//! - `dispatcher`: 评估调度（同步 / 后台队列）
//! - `query_service`: 只读查询
//! - `dto`: 数据传输对象

pub mod dispatcher;
pub mod dto;
pub mod evaluator;
pub mod query_service;

pub use dispatcher::{ActivityEvent, EvaluationDispatcher};
pub use dto::*;
pub use evaluator::{BadgeEvaluator, EvaluationReport, evaluate_user};
pub use query_service::BadgeQueryService;
