use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use sectorx_backend::models::Document;

use super::error::ApiError;
use crate::state::AppState;

/// POST /civil-registry/encode - labels back to codes / 标签编码
pub async fn encode_record(
    State(state): State<Arc<AppState>>,
    Json(record): Json<Document>,
) -> Result<Json<Document>, ApiError> {
    let encoded = state.detail.normalizer().encode_record(record)?;
    Ok(Json(encoded))
}
