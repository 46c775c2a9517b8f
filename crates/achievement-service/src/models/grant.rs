//! 徽章发放记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::badge::Badge;

/// 用户徽章发放记录
///
/// (user_id, badge_id) 唯一，创建后不会被评估器更新或删除
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Grant {
    pub user_id: i64,
    pub badge_id: i64,
    pub awarded_at: DateTime<Utc>,
}

/// 发放结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    /// 本次新插入
    Granted(Grant),
    /// 用户已持有，唯一约束拦截了重复插入
    AlreadyHeld,
}

impl GrantOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    pub fn into_grant(self) -> Option<Grant> {
        match self {
            Self::Granted(grant) => Some(grant),
            Self::AlreadyHeld => None,
        }
    }
}

/// 用户徽章视图：发放记录 + 徽章元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBadgeView {
    pub badge: Badge,
    pub awarded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_outcome_helpers() {
        let grant = Grant {
            user_id: 1,
            badge_id: 2,
            awarded_at: Utc::now(),
        };
        let outcome = GrantOutcome::Granted(grant.clone());
        assert!(outcome.is_granted());
        assert_eq!(outcome.into_grant(), Some(grant));

        assert!(!GrantOutcome::AlreadyHeld.is_granted());
        assert_eq!(GrantOutcome::AlreadyHeld.into_grant(), None);
    }
}
