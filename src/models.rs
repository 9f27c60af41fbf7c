use serde_json::{Map, Value};

/// Schemaless stored document / 无模式文档
pub type Document = Map<String, Value>;
