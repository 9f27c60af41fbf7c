//! Single-collection query pipeline / 单集合查询流程
//!
//! translate filter -> query store -> normalize (civil registry only)

use serde_json::Value;
use std::sync::Arc;

use super::registry::CIVIL_REGISTRY_COLLECTION;
use super::translator::translate;
use crate::civil::RecordNormalizer;
use crate::storage::{DocumentStore, StoreError};

/// Default number of documents returned per collection
pub const DEFAULT_RESULT_LIMIT: usize = 10;

#[derive(Clone)]
pub struct DetailQuery {
    store: Arc<dyn DocumentStore>,
    normalizer: RecordNormalizer,
    limit: usize,
}

impl DetailQuery {
    pub fn new(store: Arc<dyn DocumentStore>, normalizer: RecordNormalizer) -> Self {
        Self {
            store,
            normalizer,
            limit: DEFAULT_RESULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn normalizer(&self) -> &RecordNormalizer {
        &self.normalizer
    }

    /// Query one collection / 查询单个集合
    pub async fn run(&self, collection: &str, raw_filter: &str) -> Result<Vec<Value>, StoreError> {
        let predicate = translate(collection, raw_filter);
        tracing::debug!("Querying {} with {:?}", collection, predicate);

        let docs = self.store.find(collection, &predicate, self.limit).await?;

        let docs = if collection == CIVIL_REGISTRY_COLLECTION {
            self.normalizer.normalize(docs)
        } else {
            docs
        };

        Ok(docs.into_iter().map(Value::Object).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn query() -> DetailQuery {
        let store = MemoryStore::new();
        store.insert_many(
            "dukcapil",
            vec![json!({"NIK": 3201011205900001_i64, "NAMA_LGKP": "BUDI", "JENIS_KLMIN": 1})
                .as_object()
                .cloned()
                .unwrap()],
        );
        store.insert_many(
            "vehicle",
            (0..20)
                .map(|i| json!({"NAMA": "BUDI ", "NOPOL": format!("B{}", i)}).as_object().cloned().unwrap()),
        );
        let normalizer = RecordNormalizer::new(Arc::new(|_: i64| "ADDR".to_string()));
        DetailQuery::new(Arc::new(store), normalizer)
    }

    #[tokio::test]
    async fn test_civil_registry_records_are_normalized() {
        let docs = query().run("dukcapil", "budi").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["JENIS_KLMIN"], "M");
        assert_eq!(docs[0]["ALAMAT"], "ADDR");
    }

    #[tokio::test]
    async fn test_results_are_capped() {
        let docs = query().run("vehicle", "budi").await.unwrap();
        assert_eq!(docs.len(), DEFAULT_RESULT_LIMIT);
        assert_eq!(docs[0]["NAMA"], "BUDI ");
    }

    #[tokio::test]
    async fn test_no_match_is_empty() {
        assert!(query().run("dukcapil", "ani").await.unwrap().is_empty());
        assert!(query().run("unknown_collection", "").await.unwrap().is_empty());
    }
}
