//! 应用层：路由、处理器与业务服务

pub mod health;
pub mod products;

use axum::Router;

use products::service::ProductService;

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(products::routes())
        .merge(health::routes())
        .with_state(state)
}
