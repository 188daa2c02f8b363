//! 产品处理器
//!
//! 存储操作可能同步写快照文件，统一放到阻塞线程池中执行。

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::Json,
};

use super::model::{Product, ProductPatch};
use crate::app::AppState;
use crate::core::error::CoreError;

/// 在阻塞线程池中运行存储操作
async fn run_blocking<T, F>(task: F) -> Result<T, CoreError>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| CoreError::InternalServerError(format!("后台任务失败: {}", e)))?
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Product>, CoreError> {
    let patch = ProductPatch::from_slice(&body)?;
    let service = state.product_service;
    let product = run_blocking(move || service.create_product(patch)).await?;
    Ok(Json(product))
}

/// GET /products
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, CoreError> {
    let service = state.product_service;
    let products = run_blocking(move || service.list_products()).await?;
    Ok(Json(products))
}

/// GET /products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, CoreError> {
    let service = state.product_service;
    let product = run_blocking(move || service.get_product(&id)).await?;
    Ok(Json(product))
}

/// PUT /products/:id
///
/// 先确认产品存在再解析请求体，未知 ID 总是得到“产品不存在”的错误。
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Product>, CoreError> {
    let service = state.product_service;
    let product = run_blocking(move || {
        let existing = service.find_for_update(&id)?;
        let patch = ProductPatch::from_slice(&body)?;
        service.apply_update(existing, patch)
    })
    .await?;
    Ok(Json(product))
}

/// DELETE /products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, CoreError> {
    let service = state.product_service;
    let product = run_blocking(move || service.delete_product(&id)).await?;
    Ok(Json(product))
}
