//! 活动快照
//!
//! 单次评估内对活动查询结果的惰性缓存，不持久化。

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tokio::sync::OnceCell;

use crate::error::Result;
use crate::repository::ActivityQuery;

/// 活动快照
///
/// 每个指标只在第一次被规则读取时查询，之后复用。
/// 生命周期限定在一次评估内，不同用户、不同评估之间不共享。
pub struct ActivitySnapshot<'a> {
    user_id: i64,
    activity: &'a dyn ActivityQuery,
    post_count: OnceCell<i64>,
    post_dates: OnceCell<BTreeSet<NaiveDate>>,
    likes_received: OnceCell<i64>,
    translated_posts: OnceCell<i64>,
    comments: OnceCell<i64>,
    sold_items: OnceCell<i64>,
}

impl<'a> ActivitySnapshot<'a> {
    pub fn new(user_id: i64, activity: &'a dyn ActivityQuery) -> Self {
        Self {
            user_id,
            activity,
            post_count: OnceCell::new(),
            post_dates: OnceCell::new(),
            likes_received: OnceCell::new(),
            translated_posts: OnceCell::new(),
            comments: OnceCell::new(),
            sold_items: OnceCell::new(),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub async fn post_count(&self) -> Result<i64> {
        self.post_count
            .get_or_try_init(|| self.activity.post_count(self.user_id))
            .await
            .copied()
    }

    /// 本地小时落在 `[start_hour, end_hour)` 的帖子是否存在，不缓存
    pub async fn has_post_in_hour_range(&self, start_hour: u32, end_hour: u32) -> Result<bool> {
        self.activity
            .has_post_in_hour_range(self.user_id, start_hour, end_hour)
            .await
    }

    pub async fn distinct_post_dates(&self) -> Result<&BTreeSet<NaiveDate>> {
        self.post_dates
            .get_or_try_init(|| self.activity.distinct_post_dates(self.user_id))
            .await
    }

    pub async fn total_likes_received(&self) -> Result<i64> {
        self.likes_received
            .get_or_try_init(|| self.activity.total_likes_received(self.user_id))
            .await
            .copied()
    }

    pub async fn translated_post_count(&self) -> Result<i64> {
        self.translated_posts
            .get_or_try_init(|| self.activity.translated_post_count(self.user_id))
            .await
            .copied()
    }

    pub async fn comment_count(&self) -> Result<i64> {
        self.comments
            .get_or_try_init(|| self.activity.comment_count(self.user_id))
            .await
            .copied()
    }

    pub async fn sold_item_count(&self) -> Result<i64> {
        self.sold_items
            .get_or_try_init(|| self.activity.sold_item_count(self.user_id))
            .await
            .copied()
    }
}

/// 判断本地小时是否落在半开区间 `[start_hour, end_hour)`
///
/// `start_hour > end_hour` 表示跨越午夜，如 `[22, 4)`
pub fn hour_in_range(hour: u32, start_hour: u32, end_hour: u32) -> bool {
    if start_hour <= end_hour {
        hour >= start_hour && hour < end_hour
    } else {
        hour >= start_hour || hour < end_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockActivityQuery;

    #[test]
    fn test_hour_in_range() {
        assert!(hour_in_range(0, 0, 6));
        assert!(hour_in_range(5, 0, 6));
        assert!(!hour_in_range(6, 0, 6));
        assert!(!hour_in_range(23, 0, 6));

        // 跨午夜
        assert!(hour_in_range(23, 22, 4));
        assert!(hour_in_range(3, 22, 4));
        assert!(!hour_in_range(4, 22, 4));

        // 空区间
        assert!(!hour_in_range(5, 5, 5));
    }

    #[tokio::test]
    async fn test_metrics_are_queried_once() {
        let mut activity = MockActivityQuery::new();
        activity
            .expect_comment_count()
            .times(1)
            .returning(|_| Ok(20));

        let snapshot = ActivitySnapshot::new(7, &activity);
        assert_eq!(snapshot.comment_count().await.unwrap(), 20);
        assert_eq!(snapshot.comment_count().await.unwrap(), 20);
        assert_eq!(snapshot.user_id(), 7);
    }

    #[tokio::test]
    async fn test_failed_query_is_not_cached() {
        let mut activity = MockActivityQuery::new();
        let mut calls = 0;
        activity.expect_post_count().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(crate::error::AchievementError::Internal("timeout".to_string()))
            } else {
                Ok(3)
            }
        });

        let snapshot = ActivitySnapshot::new(1, &activity);
        assert!(snapshot.post_count().await.is_err());
        assert_eq!(snapshot.post_count().await.unwrap(), 3);
    }
}
