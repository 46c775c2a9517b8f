//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，支持 mock 测试和内存实现

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Badge, BadgeDefinition, GrantOutcome, UserBadgeView};

/// 用户活动查询接口
///
/// 所有查询只读、无副作用，针对单个用户。
/// "本地"时间由实现按配置的时区偏移换算。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityQuery: Send + Sync {
    async fn post_count(&self, user_id: i64) -> Result<i64>;

    /// 是否存在本地小时落在 `[start_hour, end_hour)` 的帖子
    ///
    /// `start_hour > end_hour` 时区间跨越午夜，相等时为空区间
    async fn has_post_in_hour_range(
        &self,
        user_id: i64,
        start_hour: u32,
        end_hour: u32,
    ) -> Result<bool>;

    async fn distinct_post_dates(&self, user_id: i64) -> Result<BTreeSet<NaiveDate>>;

    /// 用户所有帖子收到的点赞总数
    async fn total_likes_received(&self, user_id: i64) -> Result<i64>;

    async fn translated_post_count(&self, user_id: i64) -> Result<i64>;

    async fn comment_count(&self, user_id: i64) -> Result<i64>;

    async fn sold_item_count(&self, user_id: i64) -> Result<i64>;
}

/// 徽章发放存储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GrantStore: Send + Sync {
    async fn has_grant(&self, user_id: i64, badge_id: i64) -> Result<bool>;

    async fn granted_badge_ids(&self, user_id: i64) -> Result<HashSet<i64>>;

    /// 发放徽章
    ///
    /// 重复发放返回 `GrantOutcome::AlreadyHeld`，不产生副作用
    async fn grant(&self, user_id: i64, badge_id: i64) -> Result<GrantOutcome>;

    /// 用户持有的徽章及元数据，按发放时间倒序
    async fn list_user_badges(&self, user_id: i64) -> Result<Vec<UserBadgeView>>;
}

/// 徽章目录存储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeStore: Send + Sync {
    /// 按名称插入（已存在则跳过），返回是否新插入
    async fn insert_if_absent(&self, definition: &BadgeDefinition) -> Result<bool>;

    async fn list_badges(&self) -> Result<Vec<Badge>>;
}
