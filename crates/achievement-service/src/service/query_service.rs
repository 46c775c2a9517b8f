//! 徽章查询服务
//!
//! 徽章目录与用户徽章的只读投影

use std::sync::Arc;

use tracing::instrument;

use crate::catalog::BadgeCatalog;
use crate::error::Result;
use crate::repository::GrantStore;
use crate::service::dto::{BadgeOut, UserBadgeOut};

/// 徽章查询服务
#[derive(Clone)]
pub struct BadgeQueryService {
    catalog: Arc<BadgeCatalog>,
    grants: Arc<dyn GrantStore>,
}

impl BadgeQueryService {
    pub fn new(catalog: Arc<BadgeCatalog>, grants: Arc<dyn GrantStore>) -> Self {
        Self { catalog, grants }
    }

    /// 全部徽章，按目录顺序
    pub fn list_badges(&self) -> Vec<BadgeOut> {
        self.catalog.iter().map(BadgeOut::from).collect()
    }

    /// 用户已获得的徽章，最近获得的在前；用户不存在时返回空列表
    #[instrument(skip(self))]
    pub async fn list_user_badges(&self, user_id: i64) -> Result<Vec<UserBadgeOut>> {
        let views = self.grants.list_user_badges(user_id).await?;
        Ok(views.into_iter().map(UserBadgeOut::from).collect())
    }
}
