//! 评估调度
//!
//! 业务写操作提交后通知调度器，由调度器决定同步评估还是投递到后台队列。
//! 任何情况下评估失败都不会传回调用方。

use std::sync::Arc;

use dashmap::DashSet;
use memolucky_shared::config::{AchievementConfig, DispatchMode};
use memolucky_shared::observability::metrics as app_metrics;
use serde::{Deserialize, Serialize};
use tokio::sync::{Notify, Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::evaluator::BadgeEvaluator;

/// 触发徽章评估的业务事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ActivityEvent {
    PostCreated { author_id: i64 },
    CommentCreated { author_id: i64 },
    LikeAdded { post_author_id: i64 },
    LikeRemoved { post_author_id: i64 },
    ItemSold { seller_id: i64 },
    TranslationCompleted { post_author_id: i64 },
}

impl ActivityEvent {
    /// 需要重新评估徽章的用户
    pub fn affected_user(&self) -> i64 {
        match *self {
            Self::PostCreated { author_id } | Self::CommentCreated { author_id } => author_id,
            Self::LikeAdded { post_author_id }
            | Self::LikeRemoved { post_author_id }
            | Self::TranslationCompleted { post_author_id } => post_author_id,
            Self::ItemSold { seller_id } => seller_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::PostCreated { .. } => "post_created",
            Self::CommentCreated { .. } => "comment_created",
            Self::LikeAdded { .. } => "like_added",
            Self::LikeRemoved { .. } => "like_removed",
            Self::ItemSold { .. } => "item_sold",
            Self::TranslationCompleted { .. } => "translation_completed",
        }
    }
}

#[derive(Clone)]
enum Mode {
    Inline(BadgeEvaluator),
    Background(BackgroundQueue),
}

/// 后台队列的发送端
///
/// `pending` 记录已排队但尚未开始评估的用户，重复请求在此合并。
/// 队列已满时用户 id 暂存到 `overflow`，由接收循环随后取出。
#[derive(Clone)]
struct BackgroundQueue {
    tx: mpsc::Sender<i64>,
    pending: Arc<DashSet<i64>>,
    overflow: Arc<DashSet<i64>>,
    overflow_signal: Arc<Notify>,
}

impl BackgroundQueue {
    fn submit(&self, user_id: i64) {
        if !self.pending.insert(user_id) {
            debug!(user_id, "用户已在评估队列中，合并请求");
            return;
        }

        match self.tx.try_send(user_id) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(user_id, "评估队列已满，暂存待评估用户");
                app_metrics::record_dispatch_deferred();
                self.overflow.insert(user_id);
                self.overflow_signal.notify_one();
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.pending.remove(&user_id);
                warn!(user_id, "评估队列已关闭，丢弃本次评估");
                app_metrics::record_dispatch_dropped("closed");
            }
        }
    }
}

/// 后台接收循环持有的状态
struct BackgroundWorker {
    evaluator: BadgeEvaluator,
    permits: Arc<Semaphore>,
    pending: Arc<DashSet<i64>>,
    overflow: Arc<DashSet<i64>>,
}

impl BackgroundWorker {
    /// 取得许可后在独立任务中评估
    ///
    /// 先移出 `pending` 再评估，之后到达的请求会重新排队。
    async fn dispatch(&self, user_id: i64) {
        self.pending.remove(&user_id);
        let Ok(permit) = self.permits.clone().acquire_owned().await else {
            return;
        };
        let evaluator = self.evaluator.clone();
        tokio::spawn(async move {
            evaluator.evaluate_best_effort(user_id).await;
            drop(permit);
        });
    }

    async fn drain_overflow(&self) {
        let parked: Vec<i64> = self.overflow.iter().map(|entry| *entry.key()).collect();
        for user_id in parked {
            if self.overflow.remove(&user_id).is_some() {
                self.dispatch(user_id).await;
            }
        }
    }
}

/// 评估调度器
#[derive(Clone)]
pub struct EvaluationDispatcher {
    mode: Mode,
}

impl EvaluationDispatcher {
    /// 在调用方任务内同步评估
    pub fn inline(evaluator: BadgeEvaluator) -> Self {
        Self {
            mode: Mode::Inline(evaluator),
        }
    }

    /// 启动后台评估
    ///
    /// 单个接收循环从有界队列取出用户 id，最多 `workers` 个评估同时进行。
    /// 队列满时请求暂存在溢出集合，按用户去重，不会丢失。
    /// 所有调度器副本被 drop 后队列关闭，循环处理完溢出请求、等待在途评估后退出。
    pub fn spawn_background(
        evaluator: BadgeEvaluator,
        capacity: usize,
        workers: usize,
    ) -> (Self, JoinHandle<()>) {
        let workers = workers.max(1);
        let (tx, mut rx) = mpsc::channel::<i64>(capacity.max(1));
        let queue = BackgroundQueue {
            tx,
            pending: Arc::new(DashSet::new()),
            overflow: Arc::new(DashSet::new()),
            overflow_signal: Arc::new(Notify::new()),
        };
        let worker = BackgroundWorker {
            evaluator,
            permits: Arc::new(Semaphore::new(workers)),
            pending: queue.pending.clone(),
            overflow: queue.overflow.clone(),
        };
        let overflow_signal = queue.overflow_signal.clone();

        let handle = tokio::spawn(async move {
            info!(capacity, workers, "后台徽章评估已启动");

            loop {
                tokio::select! {
                    received = rx.recv() => {
                        let Some(user_id) = received else {
                            break;
                        };
                        worker.dispatch(user_id).await;
                    }
                    _ = overflow_signal.notified() => {
                        worker.drain_overflow().await;
                    }
                }
            }

            // 队列关闭后处理剩余的溢出请求，再等待在途评估结束
            worker.drain_overflow().await;
            let _ = worker.permits.acquire_many(workers as u32).await;
            info!("后台徽章评估已停止");
        });

        (
            Self {
                mode: Mode::Background(queue),
            },
            handle,
        )
    }

    /// 按配置构造调度器，后台模式同时返回接收循环句柄
    pub fn from_config(
        evaluator: BadgeEvaluator,
        config: &AchievementConfig,
    ) -> (Self, Option<JoinHandle<()>>) {
        match config.dispatch_mode {
            DispatchMode::Inline => (Self::inline(evaluator), None),
            DispatchMode::Background => {
                let (dispatcher, handle) =
                    Self::spawn_background(evaluator, config.queue_capacity, config.workers);
                (dispatcher, Some(handle))
            }
        }
    }

    pub async fn notify(&self, event: ActivityEvent) {
        debug!(event = event.kind(), user_id = event.affected_user(), "收到活动事件");
        self.notify_user(event.affected_user()).await;
    }

    /// 请求评估指定用户，永不失败
    pub async fn notify_user(&self, user_id: i64) {
        match &self.mode {
            Mode::Inline(evaluator) => {
                evaluator.evaluate_best_effort(user_id).await;
            }
            Mode::Background(queue) => queue.submit(user_id),
        }
    }
}
