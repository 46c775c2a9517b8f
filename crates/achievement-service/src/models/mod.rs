//! 成就服务领域模型

pub mod activity;
pub mod badge;
pub mod grant;

pub use activity::{ActivitySnapshot, hour_in_range};
pub use badge::{Badge, BadgeDefinition};
pub use grant::{Grant, GrantOutcome, UserBadgeView};
