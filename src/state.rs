use std::sync::Arc;

use sectorx_backend::civil::RecordNormalizer;
use sectorx_backend::config::AppConfig;
use sectorx_backend::search::{Aggregator, DetailQuery};
use sectorx_backend::storage::DocumentStore;

/// Shared request state / 共享请求状态
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub detail: Arc<DetailQuery>,
    pub aggregator: Aggregator,
}

impl AppState {
    /// Wire the query pipeline around one store handle / 围绕同一存储句柄组装查询流程
    pub fn new(store: Arc<dyn DocumentStore>, normalizer: RecordNormalizer, config: &AppConfig) -> Self {
        let detail = Arc::new(
            DetailQuery::new(store.clone(), normalizer).with_limit(config.search.result_limit),
        );
        let aggregator = Aggregator::new(detail.clone(), config.search.collections.clone())
            .with_timeout(config.search_timeout())
            .with_max_in_flight(config.search.max_concurrency);

        Self { store, detail, aggregator }
    }
}
