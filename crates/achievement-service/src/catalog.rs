//! 徽章目录
//!
//! 启动时按名称幂等播种默认徽章，之后加载为只读目录，按名称 O(1) 查找。

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{Badge, BadgeDefinition};
use crate::repository::BadgeStore;

/// 默认徽章定义
pub const DEFAULT_BADGES: [BadgeDefinition; 8] = [
    BadgeDefinition {
        name: "first_post",
        description: "发布第一篇帖子",
        icon: "https://ui-avatars.com/api/?name=FP&background=10B981&color=fff&size=200",
        category: "study",
    },
    BadgeDefinition {
        name: "night_owl",
        description: "在凌晨 0 点到 6 点之间发帖",
        icon: "https://ui-avatars.com/api/?name=NO&background=4B5563&color=fff&size=200",
        category: "study",
    },
    BadgeDefinition {
        name: "streak_poster",
        description: "连续 5 天每天发帖",
        icon: "https://ui-avatars.com/api/?name=SP&background=F59E0B&color=fff&size=200",
        category: "study",
    },
    BadgeDefinition {
        name: "polyglot",
        description: "累计 5 篇帖子被翻译",
        icon: "https://ui-avatars.com/api/?name=PL&background=3B82F6&color=fff&size=200",
        category: "study",
    },
    BadgeDefinition {
        name: "heart_collector",
        description: "帖子累计获得 10 个赞",
        icon: "https://ui-avatars.com/api/?name=HC&background=EF4444&color=fff&size=200",
        category: "social",
    },
    BadgeDefinition {
        name: "comment_king",
        description: "累计发表 20 条评论",
        icon: "https://ui-avatars.com/api/?name=CK&background=8B5CF6&color=fff&size=200",
        category: "social",
    },
    BadgeDefinition {
        name: "smart_buyer",
        description: "在市场完成购买",
        icon: "https://ui-avatars.com/api/?name=SB&background=06B6D4&color=fff&size=200",
        category: "trade",
    },
    BadgeDefinition {
        name: "top_seller",
        description: "累计售出 5 件商品",
        icon: "https://ui-avatars.com/api/?name=TS&background=14B8A6&color=fff&size=200",
        category: "trade",
    },
];

/// 播种徽章定义，返回新插入的数量
///
/// 单条失败只记录告警，不影响其余定义
pub async fn seed(store: &dyn BadgeStore, definitions: &[BadgeDefinition]) -> usize {
    let mut inserted = 0;
    for definition in definitions {
        match store.insert_if_absent(definition).await {
            Ok(true) => {
                debug!(badge = definition.name, "徽章已播种");
                inserted += 1;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(badge = definition.name, error = %e, "徽章播种失败，已跳过");
            }
        }
    }
    inserted
}

/// 只读徽章目录
#[derive(Debug, Clone, Default)]
pub struct BadgeCatalog {
    badges: Vec<Badge>,
    index: HashMap<String, usize>,
}

impl BadgeCatalog {
    pub fn from_badges(badges: Vec<Badge>) -> Self {
        let index = badges
            .iter()
            .enumerate()
            .map(|(i, badge)| (badge.name.clone(), i))
            .collect();
        Self { badges, index }
    }

    /// 读取已持久化的全部徽章
    pub async fn load(store: &dyn BadgeStore) -> Result<Self> {
        let badges = store.list_badges().await?;
        Ok(Self::from_badges(badges))
    }

    /// 播种默认徽章后加载目录
    pub async fn bootstrap(store: &dyn BadgeStore) -> Result<Self> {
        let inserted = seed(store, &DEFAULT_BADGES).await;
        let catalog = Self::load(store).await?;
        info!(
            inserted = inserted,
            total = catalog.len(),
            "徽章目录加载完成"
        );
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&Badge> {
        self.index.get(name).map(|&i| &self.badges[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Badge> {
        self.badges.iter()
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}
