//! 用户徽章发放仓储
//!
//! `user_badges` 的 (user_id, badge_id) 复合主键是防重复发放的最终保障

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::GrantStore;
use crate::error::Result;
use crate::models::{Badge, Grant, GrantOutcome, UserBadgeView};

/// 用户徽章视图行（JOIN badges）
#[derive(sqlx::FromRow)]
struct UserBadgeRow {
    id: i64,
    name: String,
    description: String,
    icon: String,
    category: String,
    awarded_at: DateTime<Utc>,
}

impl From<UserBadgeRow> for UserBadgeView {
    fn from(row: UserBadgeRow) -> Self {
        Self {
            badge: Badge {
                id: row.id,
                name: row.name,
                description: row.description,
                icon: row.icon,
                category: row.category,
            },
            awarded_at: row.awarded_at,
        }
    }
}

/// 用户徽章发放仓储
pub struct GrantRepository {
    pool: PgPool,
}

impl GrantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn has_grant(&self, user_id: i64, badge_id: i64) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_badges
                WHERE user_id = $1 AND badge_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn granted_badge_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT badge_id FROM user_badges WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    /// 插入发放记录
    ///
    /// 冲突时 `RETURNING` 无结果，视为已持有。并发插入在极端情况下
    /// 仍可能抛出唯一约束错误，同样视为已持有。
    pub async fn grant(&self, user_id: i64, badge_id: i64) -> Result<GrantOutcome> {
        let inserted = sqlx::query_as::<_, Grant>(
            r#"
            INSERT INTO user_badges (user_id, badge_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, badge_id) DO NOTHING
            RETURNING user_id, badge_id, awarded_at
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .fetch_optional(&self.pool)
        .await;

        match inserted {
            Ok(Some(grant)) => Ok(GrantOutcome::Granted(grant)),
            Ok(None) => Ok(GrantOutcome::AlreadyHeld),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Ok(GrantOutcome::AlreadyHeld)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_user_badges(&self, user_id: i64) -> Result<Vec<UserBadgeView>> {
        let rows = sqlx::query_as::<_, UserBadgeRow>(
            r#"
            SELECT b.id, b.name, b.description, b.icon, b.category, ub.awarded_at
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = $1
            ORDER BY ub.awarded_at DESC, b.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserBadgeView::from).collect())
    }
}

#[async_trait]
impl GrantStore for GrantRepository {
    async fn has_grant(&self, user_id: i64, badge_id: i64) -> Result<bool> {
        self.has_grant(user_id, badge_id).await
    }

    async fn granted_badge_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        self.granted_badge_ids(user_id).await
    }

    async fn grant(&self, user_id: i64, badge_id: i64) -> Result<GrantOutcome> {
        self.grant(user_id, badge_id).await
    }

    async fn list_user_badges(&self, user_id: i64) -> Result<Vec<UserBadgeView>> {
        self.list_user_badges(user_id).await
    }
}
