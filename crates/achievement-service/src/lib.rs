//! 成就徽章服务
//!
//! 用户发帖、评论、点赞、售出商品等写操作提交后，按规则检查用户活动并幂等发放徽章。
//!
//! ## 核心功能
//!
//! - **徽章目录**：启动时按名称幂等播种默认徽章
//! - **活动查询**：按用户统计帖子、评论、点赞、翻译、售出商品
//! - **徽章评估**：逐条规则求值，满足即发放，重复发放由唯一约束去重
//! - **评估调度**：同步评估或投递到有界后台队列，失败不影响调用方
//! - **查询接口**：徽章目录与用户徽章的只读 HTTP 接口
//!
//! ## 模块结构
//!
//! - `catalog`: 徽章目录与播种
//! - `models`: 领域模型
//! - `repository`: 仓储接口及 PostgreSQL / 内存实现
//! - `rules`: 徽章规则
//! - `service`: 评估、调度与查询服务
//! - `handlers` / `routes` / `state`: HTTP 层

pub mod catalog;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod rules;
pub mod service;
pub mod state;

pub use catalog::{BadgeCatalog, DEFAULT_BADGES};
pub use error::{AchievementError, Result};
pub use models::*;
pub use repository::{
    ActivityQuery, ActivityRepository, BadgeRepository, BadgeStore, GrantRepository, GrantStore,
    InMemoryStore,
};
pub use rules::BadgeRule;
pub use service::{
    ActivityEvent, BadgeEvaluator, BadgeQueryService, EvaluationDispatcher, EvaluationReport,
    evaluate_user,
};
pub use state::AppState;
