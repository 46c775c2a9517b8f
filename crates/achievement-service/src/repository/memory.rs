//! 内存存储
//!
//! 基于 DashMap 的活动、目录与发放记录存储，适用于测试、基准和本地开发。
//! 同时实现 `ActivityQuery`、`GrantStore`、`BadgeStore`。

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Timelike, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::traits::{ActivityQuery, BadgeStore, GrantStore};
use crate::error::{AchievementError, Result};
use crate::models::{
    Badge, BadgeDefinition, Grant, GrantOutcome, UserBadgeView, hour_in_range,
};

#[derive(Debug, Clone)]
struct PostRecord {
    author_id: i64,
    created_at: DateTime<Utc>,
    is_translated: bool,
}

#[derive(Debug, Clone)]
struct ItemRecord {
    seller_id: i64,
    sold: bool,
}

/// 内存存储
///
/// 发放记录以 (user_id, badge_id) 为键，通过 entry API 原子去重，
/// 与数据库复合主键的语义一致。
#[derive(Debug)]
pub struct InMemoryStore {
    offset: FixedOffset,
    next_id: AtomicI64,
    posts: DashMap<i64, PostRecord>,
    /// (post_id, liker_id)
    likes: DashMap<(i64, i64), ()>,
    /// comment_id -> author_id
    comments: DashMap<i64, i64>,
    items: DashMap<i64, ItemRecord>,
    badges: DashMap<String, Badge>,
    grants: DashMap<(i64, i64), Grant>,
    fail_queries: AtomicBool,
    fail_grants: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// 本地时间等于 UTC
    pub fn new() -> Self {
        Self::with_utc_offset_minutes(0)
    }

    /// 指定本地时间相对 UTC 的偏移（分钟），超出 ±24 小时按 UTC 处理
    pub fn with_utc_offset_minutes(minutes: i32) -> Self {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self {
            offset,
            next_id: AtomicI64::new(1),
            posts: DashMap::new(),
            likes: DashMap::new(),
            comments: DashMap::new(),
            items: DashMap::new(),
            badges: DashMap::new(),
            grants: DashMap::new(),
            fail_queries: AtomicBool::new(false),
            fail_grants: AtomicBool::new(false),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    // ==================== 活动写入 ====================

    /// 发帖，返回 post_id
    pub fn add_post(&self, author_id: i64, created_at: DateTime<Utc>) -> i64 {
        let id = self.next_id();
        self.posts.insert(
            id,
            PostRecord {
                author_id,
                created_at,
                is_translated: false,
            },
        );
        id
    }

    /// 标记帖子已翻译，帖子不存在时返回 false
    pub fn mark_translated(&self, post_id: i64) -> bool {
        match self.posts.get_mut(&post_id) {
            Some(mut post) => {
                post.is_translated = true;
                true
            }
            None => false,
        }
    }

    /// 点赞，同一用户对同一帖子只计一次
    pub fn add_like(&self, post_id: i64, liker_id: i64) -> bool {
        self.likes.insert((post_id, liker_id), ()).is_none()
    }

    pub fn remove_like(&self, post_id: i64, liker_id: i64) -> bool {
        self.likes.remove(&(post_id, liker_id)).is_some()
    }

    pub fn add_comment(&self, author_id: i64) -> i64 {
        let id = self.next_id();
        self.comments.insert(id, author_id);
        id
    }

    /// 上架商品，返回 item_id
    pub fn add_item(&self, seller_id: i64) -> i64 {
        let id = self.next_id();
        self.items.insert(
            id,
            ItemRecord {
                seller_id,
                sold: false,
            },
        );
        id
    }

    pub fn mark_sold(&self, item_id: i64) -> bool {
        match self.items.get_mut(&item_id) {
            Some(mut item) => {
                item.sold = true;
                true
            }
            None => false,
        }
    }

    // ==================== 故障注入 ====================

    /// 开启后所有活动查询返回错误
    pub fn set_failing_queries(&self, failing: bool) {
        self.fail_queries.store(failing, Ordering::SeqCst);
    }

    /// 开启后发放写入返回错误
    pub fn set_failing_grants(&self, failing: bool) {
        self.fail_grants.store(failing, Ordering::SeqCst);
    }

    fn check_queries(&self) -> Result<()> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(AchievementError::Internal(
                "注入的活动查询故障".to_string(),
            ));
        }
        Ok(())
    }

    /// 当前发放记录总数
    pub fn grant_count(&self) -> usize {
        self.grants.len()
    }

    fn local(&self, at: &DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.offset)
    }

    fn posts_of(&self, user_id: i64) -> impl Iterator<Item = PostRecord> + '_ {
        self.posts
            .iter()
            .filter(move |entry| entry.author_id == user_id)
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl ActivityQuery for InMemoryStore {
    async fn post_count(&self, user_id: i64) -> Result<i64> {
        self.check_queries()?;
        Ok(self.posts_of(user_id).count() as i64)
    }

    async fn has_post_in_hour_range(
        &self,
        user_id: i64,
        start_hour: u32,
        end_hour: u32,
    ) -> Result<bool> {
        self.check_queries()?;
        if start_hour > 24 || end_hour > 24 {
            return Err(AchievementError::Validation(format!(
                "小时必须在 0..=24 之间: [{start_hour}, {end_hour})"
            )));
        }

        Ok(self.posts_of(user_id).any(|post| {
            hour_in_range(self.local(&post.created_at).hour(), start_hour, end_hour)
        }))
    }

    async fn distinct_post_dates(&self, user_id: i64) -> Result<BTreeSet<NaiveDate>> {
        self.check_queries()?;
        Ok(self
            .posts_of(user_id)
            .map(|post| self.local(&post.created_at).date_naive())
            .collect())
    }

    async fn total_likes_received(&self, user_id: i64) -> Result<i64> {
        self.check_queries()?;
        let count = self
            .likes
            .iter()
            .filter(|entry| {
                let (post_id, _) = *entry.key();
                self.posts
                    .get(&post_id)
                    .is_some_and(|post| post.author_id == user_id)
            })
            .count();
        Ok(count as i64)
    }

    async fn translated_post_count(&self, user_id: i64) -> Result<i64> {
        self.check_queries()?;
        Ok(self.posts_of(user_id).filter(|p| p.is_translated).count() as i64)
    }

    async fn comment_count(&self, user_id: i64) -> Result<i64> {
        self.check_queries()?;
        Ok(self
            .comments
            .iter()
            .filter(|entry| *entry.value() == user_id)
            .count() as i64)
    }

    async fn sold_item_count(&self, user_id: i64) -> Result<i64> {
        self.check_queries()?;
        Ok(self
            .items
            .iter()
            .filter(|entry| entry.seller_id == user_id && entry.sold)
            .count() as i64)
    }
}

#[async_trait]
impl GrantStore for InMemoryStore {
    async fn has_grant(&self, user_id: i64, badge_id: i64) -> Result<bool> {
        Ok(self.grants.contains_key(&(user_id, badge_id)))
    }

    async fn granted_badge_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        Ok(self
            .grants
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.key().1)
            .collect())
    }

    async fn grant(&self, user_id: i64, badge_id: i64) -> Result<GrantOutcome> {
        if self.fail_grants.load(Ordering::SeqCst) {
            return Err(AchievementError::Internal("注入的发放写入故障".to_string()));
        }

        match self.grants.entry((user_id, badge_id)) {
            Entry::Occupied(_) => Ok(GrantOutcome::AlreadyHeld),
            Entry::Vacant(slot) => {
                let grant = Grant {
                    user_id,
                    badge_id,
                    awarded_at: Utc::now(),
                };
                slot.insert(grant.clone());
                Ok(GrantOutcome::Granted(grant))
            }
        }
    }

    async fn list_user_badges(&self, user_id: i64) -> Result<Vec<UserBadgeView>> {
        let mut views: Vec<UserBadgeView> = self
            .grants
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .filter_map(|entry| {
                let badge = self
                    .badges
                    .iter()
                    .find(|b| b.id == entry.badge_id)
                    .map(|b| b.value().clone())?;
                Some(UserBadgeView {
                    badge,
                    awarded_at: entry.awarded_at,
                })
            })
            .collect();

        views.sort_by(|a, b| {
            b.awarded_at
                .cmp(&a.awarded_at)
                .then(a.badge.id.cmp(&b.badge.id))
        });
        Ok(views)
    }
}

#[async_trait]
impl BadgeStore for InMemoryStore {
    async fn insert_if_absent(&self, definition: &BadgeDefinition) -> Result<bool> {
        match self.badges.entry(definition.name.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(definition.to_badge(self.next_id()));
                Ok(true)
            }
        }
    }

    async fn list_badges(&self) -> Result<Vec<Badge>> {
        let mut badges: Vec<Badge> = self.badges.iter().map(|b| b.value().clone()).collect();
        badges.sort_by_key(|b| b.id);
        Ok(badges)
    }
}
