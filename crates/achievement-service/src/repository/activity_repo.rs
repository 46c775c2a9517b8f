//! 用户活动查询仓储
//!
//! 只读查询 posts / comments / likes / items 表。这些表由其他业务模块写入，
//! 本仓储不做任何修改。

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::traits::ActivityQuery;
use crate::error::{AchievementError, Result};

/// 用户活动查询仓储
///
/// `created_at` 以 UTC 存储，按 `utc_offset_minutes` 换算为本地时间后
/// 再取小时和日期。
pub struct ActivityRepository {
    pool: PgPool,
    utc_offset_minutes: i32,
}

impl ActivityRepository {
    pub fn new(pool: PgPool, utc_offset_minutes: i32) -> Self {
        Self {
            pool,
            utc_offset_minutes,
        }
    }

    pub async fn post_count(&self, user_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM posts WHERE author_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn has_post_in_hour_range(
        &self,
        user_id: i64,
        start_hour: u32,
        end_hour: u32,
    ) -> Result<bool> {
        validate_hour(start_hour)?;
        validate_hour(end_hour)?;

        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM (
                    SELECT EXTRACT(
                        HOUR FROM (created_at AT TIME ZONE 'UTC') + make_interval(mins => $2::INT)
                    )::INT AS local_hour
                    FROM posts
                    WHERE author_id = $1
                ) p
                WHERE CASE
                    WHEN $3::INT <= $4::INT THEN p.local_hour >= $3::INT AND p.local_hour < $4::INT
                    ELSE p.local_hour >= $3::INT OR p.local_hour < $4::INT
                END
            )
            "#,
        )
        .bind(user_id)
        .bind(self.utc_offset_minutes)
        .bind(start_hour as i32)
        .bind(end_hour as i32)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn distinct_post_dates(&self, user_id: i64) -> Result<BTreeSet<NaiveDate>> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            r#"
            SELECT DISTINCT ((created_at AT TIME ZONE 'UTC') + make_interval(mins => $2::INT))::DATE
            FROM posts
            WHERE author_id = $1
            "#,
        )
        .bind(user_id)
        .bind(self.utc_offset_minutes)
        .fetch_all(&self.pool)
        .await?;

        Ok(dates.into_iter().collect())
    }

    pub async fn total_likes_received(&self, user_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(l.id)
            FROM likes l
            JOIN posts p ON p.id = l.post_id
            WHERE p.author_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn translated_post_count(&self, user_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM posts WHERE author_id = $1 AND is_translated = TRUE
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn comment_count(&self, user_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM comments WHERE author_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn sold_item_count(&self, user_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM items WHERE user_id = $1 AND status = 'sold'
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

fn validate_hour(hour: u32) -> Result<()> {
    if hour > 24 {
        return Err(AchievementError::Validation(format!(
            "小时必须在 0..=24 之间: {hour}"
        )));
    }
    Ok(())
}

#[async_trait]
impl ActivityQuery for ActivityRepository {
    async fn post_count(&self, user_id: i64) -> Result<i64> {
        self.post_count(user_id).await
    }

    async fn has_post_in_hour_range(
        &self,
        user_id: i64,
        start_hour: u32,
        end_hour: u32,
    ) -> Result<bool> {
        self.has_post_in_hour_range(user_id, start_hour, end_hour)
            .await
    }

    async fn distinct_post_dates(&self, user_id: i64) -> Result<BTreeSet<NaiveDate>> {
        self.distinct_post_dates(user_id).await
    }

    async fn total_likes_received(&self, user_id: i64) -> Result<i64> {
        self.total_likes_received(user_id).await
    }

    async fn translated_post_count(&self, user_id: i64) -> Result<i64> {
        self.translated_post_count(user_id).await
    }

    async fn comment_count(&self, user_id: i64) -> Result<i64> {
        self.comment_count(user_id).await
    }

    async fn sold_item_count(&self, user_id: i64) -> Result<i64> {
        self.sold_item_count(user_id).await
    }
}
