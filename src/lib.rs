//! # EcoGrocer 产品目录服务
//!
//! 一个基于 Axum 的有机产品 REST CRUD 服务：
//! - 有序键值存储（可持久化到快照文件）
//! - 产品的创建、列表、查询、更新、删除
//! - TOML 配置、按日期滚动的日志、请求日志中间件

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

use axum::{middleware, Router};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

pub use app::{products::model::Product, products::service::ProductService, AppState};
pub use config::Config;

/// 构建完整的应用路由
pub fn build_router(product_service: ProductService, timeout: Duration) -> Router {
    app::router(AppState { product_service })
        .layer(middleware::from_fn(
            crate::core::middleware::request_logging_middleware,
        ))
        .layer(TimeoutLayer::new(timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
