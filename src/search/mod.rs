//! Search module - filter translation and collection fan-out / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - `translator` turns a raw filter into a `Predicate` (pure, never fails)
//! - `detail` runs one collection: translate -> store -> normalize
//! - `aggregator` fans one filter out to every collection under a deadline
//! - Call direction: aggregator → detail → translator / store (unidirectional)

pub mod aggregator;
pub mod detail;
pub mod predicate;
pub mod registry;
pub mod translator;

pub use aggregator::{Aggregator, CollectionFailure, SearchReport};
pub use detail::DetailQuery;
pub use predicate::{Comparison, Predicate};
pub use registry::{get_source, source_names, CIVIL_REGISTRY_COLLECTION};
pub use translator::translate;
