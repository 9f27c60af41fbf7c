//! Filter translation - raw filter text to structured predicate / 过滤条件转换
//!
//! Translation is pure and total: every (collection, filter) pair yields exactly one
//! predicate, and unknown collections degrade to match-all instead of failing.

use serde_json::Value;

use super::predicate::Predicate;
use super::registry::{get_source, ValueRule};
use crate::utils::parse_all_digits;

/// Build the predicate for a collection and raw filter / 构建集合查询谓词
pub fn translate(collection: &str, raw_filter: &str) -> Predicate {
    let folded = raw_filter.to_uppercase();

    let Some(source) = get_source(collection) else {
        tracing::debug!("No search schema for collection {}, matching all", collection);
        return Predicate::MatchAll;
    };

    if folded.is_empty() {
        return source.default_predicate();
    }

    let typed = typed_value(&folded);
    Predicate::Or(
        source
            .search_fields
            .iter()
            .map(|rule| {
                let value = match rule.rule {
                    ValueRule::Typed => typed.clone(),
                    ValueRule::RawText => Value::String(raw_filter.to_string()),
                    ValueRule::PaddedText => Value::String(format!("{} ", folded)),
                };
                Predicate::eq(rule.field, value)
            })
            .collect(),
    )
}

/// Integer for all-digit filters, the folded string otherwise / 数字过滤转为整数
fn typed_value(folded: &str) -> Value {
    match parse_all_digits(folded) {
        Some(n) => Value::from(n),
        None => Value::String(folded.to_string()),
    }
}
