//! HTTP 请求处理器

pub mod activity;
pub mod badge;
pub mod health;
