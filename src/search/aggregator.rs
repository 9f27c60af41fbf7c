//! Multi-collection fan-out search / 多集合并发搜索
//!
//! One task per collection, admitted through a semaphore, all bounded by a single
//! deadline. Only the coordinating task touches the merged result: task outcomes
//! arrive through the `JoinSet`. A failing, empty or late collection is left out.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};

use super::detail::DetailQuery;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_IN_FLIGHT: usize = 5;

/// Why a collection is missing from the merged result / 集合失败原因
#[derive(Debug, Clone, Serialize)]
pub struct CollectionFailure {
    pub collection: String,
    pub reason: String,
}

/// Fan-out outcome / 扇出结果
#[derive(Debug, Default, Serialize)]
pub struct SearchReport {
    /// collection -> matched documents (non-empty only)
    pub hits: BTreeMap<String, Value>,
    pub failures: Vec<CollectionFailure>,
}

#[derive(Clone)]
pub struct Aggregator {
    detail: Arc<DetailQuery>,
    collections: Vec<String>,
    timeout: Duration,
    max_in_flight: usize,
}

impl Aggregator {
    pub fn new(detail: Arc<DetailQuery>, collections: Vec<String>) -> Self {
        Self {
            detail,
            collections,
            timeout: DEFAULT_TIMEOUT,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Run one filter against every collection / 对所有集合执行同一过滤
    pub async fn search(&self, raw_filter: &str) -> SearchReport {
        let deadline = Instant::now() + self.timeout;
        let gate = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();

        for name in &self.collections {
            let gate = gate.clone();
            let detail = self.detail.clone();
            let name = name.clone();
            let filter = raw_filter.to_string();

            tasks.spawn(async move {
                let outcome = match gate.acquire_owned().await {
                    Ok(_permit) => detail.run(&name, &filter).await.map_err(|e| e.to_string()),
                    Err(e) => Err(format!("admission gate closed: {}", e)),
                };
                (name, outcome)
            });
        }

        let mut report = SearchReport::default();
        let mut pending: Vec<String> = self.collections.clone();

        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((name, outcome)))) => {
                    pending.retain(|n| n != &name);
                    match outcome {
                        Ok(docs) if docs.is_empty() => {}
                        Ok(docs) => {
                            report.hits.insert(name, Value::Array(docs));
                        }
                        Err(reason) => {
                            tracing::warn!("Search failed for collection {}: {}", name, reason);
                            report.failures.push(CollectionFailure { collection: name, reason });
                        }
                    }
                }
                Ok(Some(Err(e))) => {
                    // The task id is lost with a panic; the name stays in `pending`
                    tracing::warn!("Search task aborted: {}", e);
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        "Search deadline of {:?} reached, cancelling {} collection(s)",
                        self.timeout,
                        tasks.len()
                    );
                    tasks.abort_all();
                    // Wait for cancellation to land; late results are discarded
                    while tasks.join_next().await.is_some() {}
                    break;
                }
            }
        }

        for name in pending {
            report.failures.push(CollectionFailure {
                collection: name,
                reason: "cancelled or aborted before completion".to_string(),
            });
        }

        tracing::info!(
            "Search finished: {} collection(s) with hits, {} failed",
            report.hits.len(),
            report.failures.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::civil::RecordNormalizer;
    use crate::models::Document;
    use crate::search::registry::source_names;
    use crate::search::Predicate;
    use crate::storage::{DocumentStore, MemoryStore, StoreError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that answers every collection after a delay and tracks concurrency
    struct SlowStore {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowStore {
        fn new(delay: Duration) -> Self {
            Self { delay, in_flight: AtomicUsize::new(0), peak: AtomicUsize::new(0) }
        }
    }

    struct InFlightGuard<'a>(&'a AtomicUsize);

    impl Drop for InFlightGuard<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl DocumentStore for SlowStore {
        async fn find(&self, collection: &str, _: &Predicate, _: usize) -> Result<Vec<Document>, StoreError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            let _guard = InFlightGuard(&self.in_flight);
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(vec![json!({"source": collection}).as_object().cloned().unwrap()])
        }

        async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }

        async fn estimated_count(&self, _: &str) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    /// Store that fails for one collection and delegates the rest
    struct FlakyStore {
        inner: MemoryStore,
        broken: &'static str,
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn find(&self, collection: &str, p: &Predicate, limit: usize) -> Result<Vec<Document>, StoreError> {
            if collection == self.broken {
                return Err(StoreError::Unavailable("connection reset".to_string()));
            }
            self.inner.find(collection, p, limit).await
        }

        async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
            self.inner.collection_names().await
        }

        async fn estimated_count(&self, c: &str) -> Result<u64, StoreError> {
            self.inner.estimated_count(c).await
        }
    }

    fn detail(store: Arc<dyn DocumentStore>) -> Arc<DetailQuery> {
        let normalizer = RecordNormalizer::new(Arc::new(|_: i64| String::new()));
        Arc::new(DetailQuery::new(store, normalizer))
    }

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let store = Arc::new(SlowStore::new(Duration::from_millis(40)));
        let aggregator = Aggregator::new(detail(store.clone()), source_names());

        let report = aggregator.search("budi").await;

        assert_eq!(report.hits.len(), 19);
        assert!(report.failures.is_empty());
        let peak = store.peak.load(Ordering::SeqCst);
        assert!(peak <= DEFAULT_MAX_IN_FLIGHT, "peak in flight was {}", peak);
        assert!(peak >= 2, "queries did not overlap");
    }

    #[tokio::test]
    async fn test_deadline_bounds_wall_clock() {
        let store = Arc::new(SlowStore::new(Duration::from_secs(30)));
        let aggregator = Aggregator::new(detail(store.clone()), source_names())
            .with_timeout(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let report = aggregator.search("").await;
        let elapsed = started.elapsed();

        assert!(elapsed < Duration::from_millis(200) + Duration::from_millis(500), "took {:?}", elapsed);
        assert!(report.hits.is_empty());
        assert_eq!(report.failures.len(), 19);
        // cancelled queries released their slots
        assert_eq!(store.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_partial_deadline_keeps_finished_collections() {
        // 2 slots, 60ms each: the first rounds finish, the rest are cut off
        let store = Arc::new(SlowStore::new(Duration::from_millis(60)));
        let aggregator = Aggregator::new(detail(store), source_names())
            .with_max_in_flight(2)
            .with_timeout(Duration::from_millis(200));

        let report = aggregator.search("x").await;

        assert!(!report.hits.is_empty());
        assert!(report.hits.len() < 19);
        assert_eq!(report.hits.len() + report.failures.len(), 19);
    }

    #[tokio::test]
    async fn test_failed_and_empty_collections_are_omitted() {
        let inner = MemoryStore::new();
        inner.insert_many("fithub", vec![doc(json!({"name": "BUDI"}))]);
        inner.insert_many("gojek_customer", vec![doc(json!({"Email": "BUDI"}))]);
        inner.insert_many("vehicle", vec![doc(json!({"NAMA": "ANI "}))]);
        let store = Arc::new(FlakyStore { inner, broken: "gojek_customer" });

        let report = Aggregator::new(detail(store), source_names()).search("budi").await;

        assert_eq!(report.hits.keys().collect::<Vec<_>>(), vec!["fithub"]);
        assert_eq!(report.hits["fithub"], json!([{"name": "BUDI"}]));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].collection, "gojek_customer");
    }

    #[tokio::test]
    async fn test_empty_filter_uses_default_views() {
        let inner = MemoryStore::new();
        inner.insert_many("rupa2_customer", vec![doc(json!({"email": "-"}))]);
        inner.insert_many("bankraya_pinang_flexi", vec![doc(json!({"Tagihan Pokok": 12000000}))]);
        let store: Arc<dyn DocumentStore> = Arc::new(inner);

        let report = Aggregator::new(detail(store), source_names()).search("").await;

        assert_eq!(report.hits.keys().collect::<Vec<_>>(), vec!["bankraya_pinang_flexi"]);
    }
}
