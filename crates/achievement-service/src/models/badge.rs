//! 徽章目录实体

use serde::{Deserialize, Serialize};

/// 徽章定义（已持久化）
///
/// 目录条目，启动时播种后不再修改。规则按 `name` 匹配，而非数值 id。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Badge {
    pub id: i64,
    /// 稳定的业务键，全局唯一
    pub name: String,
    pub description: String,
    /// 展示图标 URL
    pub icon: String,
    /// 徽章墙分组：study / social / trade
    pub category: String,
}

/// 播种用的静态徽章定义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: &'static str,
}

impl BadgeDefinition {
    /// 以给定 id 构造持久化后的实体（内存存储使用）
    pub fn to_badge(&self, id: i64) -> Badge {
        Badge {
            id,
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            category: self.category.to_string(),
        }
    }
}
