//! Collection query endpoints / 集合查询接口

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::error::ApiError;
use crate::state::AppState;

/// Collections at or below this size are left out of the listing
const LIST_MIN_DOCUMENTS: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub filter: String,
}

/// GET /search - fan one filter out to every collection / 多集合搜索
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<BTreeMap<String, Value>> {
    let report = state.aggregator.search(&params.filter).await;
    Json(report.hits)
}

/// GET /detail-data - query one collection / 单集合查询
pub async fn detail_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DetailParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    if params.q.is_empty() {
        return Err(ApiError::MissingParam("q"));
    }

    let docs = state.detail.run(&params.q, &params.filter).await?;
    Ok(Json(docs))
}

/// GET /list-data - document counts of sizeable collections / 集合文档数
pub async fn list_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, u64>>, ApiError> {
    let mut counts = BTreeMap::new();
    for name in state.store.collection_names().await? {
        let count = state.store.estimated_count(&name).await?;
        if count > LIST_MIN_DOCUMENTS {
            counts.insert(name, count);
        }
    }
    Ok(Json(counts))
}
