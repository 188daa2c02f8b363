//! 健康检查

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use tracing::warn;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let timestamp = chrono::Utc::now().to_rfc3339();
    let version = env!("CARGO_PKG_VERSION");

    match state.product_service.count() {
        Ok(records) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "timestamp": timestamp,
                "version": version,
                "store": { "records": records }
            })),
        ),
        Err(err) => {
            warn!(error = %err, "健康检查时存储不可用");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "degraded",
                    "timestamp": timestamp,
                    "version": version,
                    "store": { "error": "store unavailable" }
                })),
            )
        }
    }
}
