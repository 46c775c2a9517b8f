//! 数据库仓储层
//!
//! 评估器只依赖这里的 trait，具体实现可以是 PostgreSQL 或内存存储。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据读写，不包含业务逻辑
//! - 活动查询只读，每次调用都是独立语句，能看到调用前已提交的写入
//! - 发放记录的唯一性由存储层约束保证

mod activity_repo;
mod badge_repo;
mod grant_repo;
pub mod memory;
mod traits;

pub use activity_repo::ActivityRepository;
pub use badge_repo::BadgeRepository;
pub use grant_repo::GrantRepository;
pub use memory::InMemoryStore;
pub use traits::*;
