//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    describe_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册指标描述，出现在 /metrics 的 HELP 注释中
fn describe_metrics(service_name: &str) {
    metrics::describe_counter!(
        "badge_evaluations_total",
        "Total number of badge evaluations"
    );
    metrics::describe_histogram!(
        "badge_evaluation_duration_seconds",
        "Badge evaluation duration in seconds"
    );
    metrics::describe_counter!("badge_grants_total", "Total number of badge grants");
    metrics::describe_counter!(
        "badge_dispatch_dropped_total",
        "Evaluation requests dropped by the dispatcher"
    );
    metrics::describe_counter!(
        "badge_dispatch_deferred_total",
        "Evaluation requests parked in the overflow set because the queue was full"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 获取全局 Prometheus handle
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// 记录一次徽章评估
#[inline]
pub fn record_badge_evaluation(status: &str, duration_secs: f64) {
    metrics::counter!("badge_evaluations_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("badge_evaluation_duration_seconds").record(duration_secs);
}

/// 记录徽章发放
#[inline]
pub fn record_badge_grant(badge: &str) {
    metrics::counter!("badge_grants_total", "badge" => badge.to_string()).increment(1);
}

/// 记录被丢弃的评估请求
#[inline]
pub fn record_dispatch_dropped(reason: &str) {
    metrics::counter!("badge_dispatch_dropped_total", "reason" => reason.to_string())
        .increment(1);
}

/// 记录队列已满时暂存的评估请求
#[inline]
pub fn record_dispatch_deferred() {
    metrics::counter!("badge_dispatch_deferred_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        // 即使没有初始化 recorder，这些函数也不应该 panic
        record_badge_evaluation("success", 0.01);
        record_badge_grant("first_post");
        record_dispatch_dropped("closed");
        record_dispatch_deferred();
    }
}
