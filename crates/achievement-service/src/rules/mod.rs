//! 徽章规则
//!
//! 每种徽章对应一个谓词，按目录中的名称匹配。谓词之间互相独立，
//! 只通过活动快照读取数据。

mod streak;

pub use streak::longest_streak;

use crate::error::Result;
use crate::models::ActivitySnapshot;

/// 夜猫子：本地时间 [0, 6) 点
pub const NIGHT_START_HOUR: u32 = 0;
pub const NIGHT_END_HOUR: u32 = 6;
pub const STREAK_DAYS: usize = 5;
pub const POLYGLOT_TRANSLATED_POSTS: i64 = 5;
pub const HEART_COLLECTOR_LIKES: i64 = 10;
pub const COMMENT_KING_COMMENTS: i64 = 20;
pub const TOP_SELLER_SOLD_ITEMS: i64 = 5;

/// 徽章规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeRule {
    FirstPost,
    NightOwl,
    StreakPoster,
    Polyglot,
    HeartCollector,
    CommentKing,
    TopSeller,
    SmartBuyer,
}

impl BadgeRule {
    pub const ALL: [BadgeRule; 8] = [
        Self::FirstPost,
        Self::NightOwl,
        Self::StreakPoster,
        Self::Polyglot,
        Self::HeartCollector,
        Self::CommentKing,
        Self::TopSeller,
        Self::SmartBuyer,
    ];

    /// 按徽章名称查找规则，未知名称返回 None
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule| rule.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstPost => "first_post",
            Self::NightOwl => "night_owl",
            Self::StreakPoster => "streak_poster",
            Self::Polyglot => "polyglot",
            Self::HeartCollector => "heart_collector",
            Self::CommentKing => "comment_king",
            Self::TopSeller => "top_seller",
            Self::SmartBuyer => "smart_buyer",
        }
    }

    /// 判断用户当前活动是否满足规则
    pub async fn is_satisfied(&self, snapshot: &ActivitySnapshot<'_>) -> Result<bool> {
        let satisfied = match self {
            Self::FirstPost => snapshot.post_count().await? >= 1,
            Self::NightOwl => {
                snapshot
                    .has_post_in_hour_range(NIGHT_START_HOUR, NIGHT_END_HOUR)
                    .await?
            }
            Self::StreakPoster => {
                longest_streak(snapshot.distinct_post_dates().await?) >= STREAK_DAYS
            }
            Self::Polyglot => snapshot.translated_post_count().await? >= POLYGLOT_TRANSLATED_POSTS,
            Self::HeartCollector => snapshot.total_likes_received().await? >= HEART_COLLECTOR_LIKES,
            Self::CommentKing => snapshot.comment_count().await? >= COMMENT_KING_COMMENTS,
            Self::TopSeller => snapshot.sold_item_count().await? >= TOP_SELLER_SOLD_ITEMS,
            // TODO: 接入订单购买记录后按买家成交数判断
            Self::SmartBuyer => false,
        };
        Ok(satisfied)
    }
}

impl std::fmt::Display for BadgeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
