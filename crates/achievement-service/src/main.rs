//! 成就徽章服务
//!
//! 启动时播种徽章目录，提供徽章查询接口，并接收活动事件触发评估。

use std::sync::Arc;
use std::time::Duration;

use achievement::{
    ActivityRepository, AppState, BadgeCatalog, BadgeEvaluator, BadgeQueryService,
    BadgeRepository, EvaluationDispatcher, GrantRepository, routes,
};
use axum::http::StatusCode;
use memolucky_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};

const SERVICE_NAME: &str = "achievement-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, config_error) = match AppConfig::load(SERVICE_NAME) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    let obs_config = config
        .observability
        .clone()
        .with_service_name(SERVICE_NAME);
    let _guard = observability::init(&obs_config).await?;

    if let Some(e) = config_error {
        warn!(error = %e, "配置加载失败，使用默认配置");
    }

    info!("Starting {} on {}", SERVICE_NAME, config.server_addr());

    let db = Database::connect(&config.database).await?;
    db.run_migrations().await?;

    let badge_repo = BadgeRepository::new(db.pool().clone());
    let catalog = Arc::new(BadgeCatalog::bootstrap(&badge_repo).await?);

    let activity = Arc::new(ActivityRepository::new(
        db.pool().clone(),
        config.achievement.local_utc_offset_minutes,
    ));
    let grants = Arc::new(GrantRepository::new(db.pool().clone()));

    let evaluator = BadgeEvaluator::new(catalog.clone(), activity, grants.clone());
    let (dispatcher, worker) = EvaluationDispatcher::from_config(evaluator, &config.achievement);
    info!(
        mode = ?config.achievement.dispatch_mode,
        "徽章评估调度器已就绪"
    );

    let state = AppState::new(BadgeQueryService::new(catalog, grants), dispatcher);

    let app = routes::build_router(state).layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.server.request_timeout_seconds),
    ));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 收到关闭信号后停止接收新连接，等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 路由持有的调度器副本已全部释放，队列关闭后等待在途评估完成
    if let Some(worker) = worker {
        if let Err(e) = worker.await {
            warn!(error = %e, "后台评估任务异常退出");
        }
    }

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// K8s 通过 SIGTERM 通知 Pod 停止；本地开发通过 Ctrl+C。
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
