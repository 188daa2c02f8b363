use anyhow::Context;
use ecogrocer::config::Config;
use ecogrocer::core::clock::SystemClock;
use ecogrocer::infrastructure::{
    logger,
    store::{KeyValueStore, StableMap},
};
use ecogrocer::{build_router, Product, ProductService};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::resolve(std::env::args().nth(1)).context("加载配置失败")?;
    let _guard = logger::init_logging(&config.logging).context("初始化日志失败")?;

    info!("启动 EcoGrocer 产品目录服务...");

    let store: Arc<dyn KeyValueStore<Product>> = if config.storage.persistent {
        let table = StableMap::<Product>::open(&config.storage.data_dir, config.storage.table_id)
            .context("打开产品存储失败")?;
        Arc::new(table)
    } else {
        info!("使用内存存储，重启后数据不会保留");
        Arc::new(StableMap::<Product>::in_memory())
    };

    let service = ProductService::new(store, Arc::new(SystemClock))
        .with_write_miss_status(config.api.write_miss_status);
    let app = build_router(service, Duration::from_secs(config.http.timeout_seconds));

    let listener = TcpListener::bind(config.http.address())
        .await
        .with_context(|| format!("无法绑定到 {}", config.http.address()))?;

    info!("🚀 EcoGrocer 服务运行在 http://{}", listener.local_addr()?);
    info!("   POST   /products      - 创建产品");
    info!("   GET    /products      - 获取所有产品");
    info!("   GET    /products/:id  - 获取特定产品");
    info!("   PUT    /products/:id  - 更新产品");
    info!("   DELETE /products/:id  - 删除产品");
    info!("   GET    /health        - 健康检查");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务器运行失败")?;

    info!("服务已停止");
    Ok(())
}

/// 等待 Ctrl-C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "监听 Ctrl-C 失败");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "监听 SIGTERM 失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("收到停止信号，正在关闭...");
}
