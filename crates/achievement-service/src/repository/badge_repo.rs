//! 徽章目录仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::BadgeStore;
use crate::error::Result;
use crate::models::{Badge, BadgeDefinition};

/// 徽章目录仓储
pub struct BadgeRepository {
    pool: PgPool,
}

impl BadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按名称插入徽章，名称冲突时不做任何修改
    pub async fn insert_if_absent(&self, definition: &BadgeDefinition) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO badges (name, description, icon, category)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(definition.name)
        .bind(definition.description)
        .bind(definition.icon)
        .bind(definition.category)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 列出全部徽章
    pub async fn list_badges(&self) -> Result<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT id, name, description, icon, category
            FROM badges
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }
}

#[async_trait]
impl BadgeStore for BadgeRepository {
    async fn insert_if_absent(&self, definition: &BadgeDefinition) -> Result<bool> {
        self.insert_if_absent(definition).await
    }

    async fn list_badges(&self) -> Result<Vec<Badge>> {
        self.list_badges().await
    }
}
