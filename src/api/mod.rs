pub mod civil;
pub mod data;
pub mod error;
pub mod server;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// HTTP routes / 路由表
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        // 查询API
        .route("/search", get(data::search))
        .route("/detail-data", get(data::detail_data))
        .route("/list-data", get(data::list_data))
        // 户籍记录编码
        .route("/civil-registry/encode", post(civil::encode_record))
        .with_state(state)
}
