//! Document store interface / 文档存储接口
//!
//! The store only exposes primitive operations (find, list, count). Callers own
//! predicate construction, limits and post-processing.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Document;
use crate::search::Predicate;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Store failure / 存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Document store (provides only primitive operations) / 文档存储
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find up to `limit` documents of a collection matching the predicate / 查询文档
    ///
    /// Result order is unspecified. Dropping the returned future abandons the query.
    async fn find(
        &self,
        collection: &str,
        predicate: &Predicate,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError>;

    /// Names of all collections holding at least one document / 集合列表
    async fn collection_names(&self) -> Result<Vec<String>, StoreError>;

    /// Approximate number of documents in a collection / 文档数估计
    async fn estimated_count(&self, collection: &str) -> Result<u64, StoreError>;
}
