//! 数据传输对象
//!
//! 字段名保持 snake_case，与现有 Web 客户端读取的结构一致

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Badge, UserBadgeView};

/// 徽章展示信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeOut {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
}

impl From<&Badge> for BadgeOut {
    fn from(badge: &Badge) -> Self {
        Self {
            id: badge.id,
            name: badge.name.clone(),
            description: badge.description.clone(),
            icon: badge.icon.clone(),
        }
    }
}

/// 用户已获得的徽章
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBadgeOut {
    pub badge: BadgeOut,
    pub awarded_at: DateTime<Utc>,
}

impl From<UserBadgeView> for UserBadgeOut {
    fn from(view: UserBadgeView) -> Self {
        Self {
            badge: BadgeOut::from(&view.badge),
            awarded_at: view.awarded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_badge_serialization() {
        let view = UserBadgeView {
            badge: Badge {
                id: 3,
                name: "polyglot".to_string(),
                description: "d".to_string(),
                icon: "i".to_string(),
                category: "study".to_string(),
            },
            awarded_at: Utc::now(),
        };

        let json = serde_json::to_value(UserBadgeOut::from(view)).unwrap();
        assert_eq!(json["badge"]["name"], "polyglot");
        assert!(json["awarded_at"].is_string());
        assert!(json["badge"].get("category").is_none());
    }
}
