// ==========================================
// 商品目录导入系统 - HTTP 服务入口
// ==========================================
// 技术栈: Tokio + Axum + SQLite
// ==========================================

use catalog_import::app::{router, AppState, ServerConfig};
use catalog_import::logging;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", catalog_import::APP_NAME);
    tracing::info!("系统版本: {}", catalog_import::VERSION);
    tracing::info!("==================================================");

    let server_config = ServerConfig::from_env();
    tracing::info!("使用数据库: {}", server_config.db_path);

    let state = AppState::new(server_config.db_path.clone())
        .await
        .map_err(anyhow::Error::msg)?;
    let shutdown = state.shutdown.clone();

    let app = router(state, server_config.max_body_bytes);
    let listener = TcpListener::bind(&server_config.bind_addr).await?;
    tracing::info!("监听地址: {}", server_config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("服务已停止");
    Ok(())
}

/// 等待 Ctrl+C；收到后通知进行中的导入任务在行间停止
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("监听关闭信号失败: {}", e);
    }
    tracing::info!("收到关闭信号");
    shutdown.cancel();
}
