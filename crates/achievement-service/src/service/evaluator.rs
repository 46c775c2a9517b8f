//! 徽章评估器
//!
//! 针对单个用户检查目录中每个未持有的徽章，满足规则即发放。
//!
//! ## 评估流程
//!
//! 1. 读取用户已持有的徽章 id
//! 2. 对未持有且有规则的徽章逐一求值，任一查询失败则整体放弃，不发放任何徽章
//! 3. 对满足条件的徽章写入发放记录，已持有视为成功
//!
//! 多次调用结果相同；同一用户并发评估时由存储层唯一约束去重。

use std::sync::Arc;
use std::time::Instant;

use memolucky_shared::observability::metrics as app_metrics;
use tracing::{debug, error, info, instrument};

use crate::catalog::BadgeCatalog;
use crate::error::Result;
use crate::models::{ActivitySnapshot, Badge, Grant, GrantOutcome};
use crate::repository::{ActivityQuery, GrantStore};
use crate::rules::BadgeRule;

/// 评估用户徽章，返回本次新发放的记录
#[instrument(skip(catalog, activity, grants))]
pub async fn evaluate_user(
    user_id: i64,
    catalog: &BadgeCatalog,
    activity: &dyn ActivityQuery,
    grants: &dyn GrantStore,
) -> Result<Vec<Grant>> {
    let held = grants.granted_badge_ids(user_id).await?;
    let snapshot = ActivitySnapshot::new(user_id, activity);

    // 阶段一：只读求值，出错直接返回
    let mut satisfied: Vec<&Badge> = Vec::new();
    for badge in catalog.iter() {
        if held.contains(&badge.id) {
            continue;
        }
        let Some(rule) = BadgeRule::from_name(&badge.name) else {
            continue;
        };
        if rule.is_satisfied(&snapshot).await? {
            satisfied.push(badge);
        }
    }

    // 阶段二：写入发放记录
    let mut created = Vec::with_capacity(satisfied.len());
    for badge in satisfied {
        match grants.grant(user_id, badge.id).await? {
            GrantOutcome::Granted(grant) => {
                info!(user_id, badge = %badge.name, "徽章发放成功");
                app_metrics::record_badge_grant(&badge.name);
                created.push(grant);
            }
            GrantOutcome::AlreadyHeld => {
                debug!(user_id, badge = %badge.name, "徽章已持有，跳过");
            }
        }
    }

    Ok(created)
}

/// 单次评估结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationReport {
    pub user_id: i64,
    pub granted: Vec<Grant>,
}

/// 徽章评估器
///
/// 持有目录与存储的共享引用，可在多个任务间克隆使用。
#[derive(Clone)]
pub struct BadgeEvaluator {
    catalog: Arc<BadgeCatalog>,
    activity: Arc<dyn ActivityQuery>,
    grants: Arc<dyn GrantStore>,
}

impl BadgeEvaluator {
    pub fn new(
        catalog: Arc<BadgeCatalog>,
        activity: Arc<dyn ActivityQuery>,
        grants: Arc<dyn GrantStore>,
    ) -> Self {
        Self {
            catalog,
            activity,
            grants,
        }
    }

    /// 评估用户徽章，错误向上传播
    pub async fn evaluate(&self, user_id: i64) -> Result<EvaluationReport> {
        let start = Instant::now();
        let result = evaluate_user(
            user_id,
            &self.catalog,
            self.activity.as_ref(),
            self.grants.as_ref(),
        )
        .await;
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok(granted) => {
                app_metrics::record_badge_evaluation("success", elapsed);
                Ok(EvaluationReport { user_id, granted })
            }
            Err(e) => {
                app_metrics::record_badge_evaluation("failure", elapsed);
                Err(e)
            }
        }
    }

    /// 尽力评估：失败只记录日志，不影响调用方
    pub async fn evaluate_best_effort(&self, user_id: i64) -> Option<EvaluationReport> {
        match self.evaluate(user_id).await {
            Ok(report) => Some(report),
            Err(e) => {
                error!(
                    user_id,
                    error = %e,
                    retryable = e.is_retryable(),
                    "徽章评估失败，已放弃本次评估"
                );
                None
            }
        }
    }
}
