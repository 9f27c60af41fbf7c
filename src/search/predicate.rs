//! Structured query predicate / 结构化查询谓词
//!
//! A boolean expression tree over field comparisons. The tree is evaluated either
//! in memory (`matches`) or compiled to a SQLite `WHERE` fragment over JSON bodies
//! (`to_sql`). Both paths share the same comparison rules:
//! - `Eq` / `Ne` are type-strict, except that numbers compare numerically (1 == 1.0)
//! - `Ne` also matches documents where the field is absent
//! - `Gt` only compares numbers with numbers and strings with strings
//! - `Exists(true)` matches a present field even when its value is `null`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Field comparison operator / 字段比较操作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Exists(bool),
}

/// Predicate tree / 谓词树
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every document / 匹配全部
    MatchAll,
    Compare { field: String, op: Comparison },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

/// Bind parameter produced by SQL compilation / SQL 绑定参数
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Real(f64),
}

impl Predicate {
    pub fn compare(field: impl Into<String>, op: Comparison) -> Self {
        Predicate::Compare { field: field.into(), op }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Eq(value.into()))
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Ne(value.into()))
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Gt(value.into()))
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Predicate::MatchAll)
    }

    /// Evaluate against a document in memory / 内存中求值
    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        match self {
            Predicate::MatchAll => true,
            Predicate::And(items) => items.iter().all(|p| p.matches(doc)),
            // Empty OR never matches
            Predicate::Or(items) => items.iter().any(|p| p.matches(doc)),
            Predicate::Compare { field, op } => {
                let value = lookup_path(doc, field);
                match op {
                    Comparison::Eq(expected) => value.map_or(false, |v| values_equal(v, expected)),
                    Comparison::Ne(expected) => value.map_or(true, |v| !values_equal(v, expected)),
                    Comparison::Gt(bound) => {
                        value.map_or(false, |v| compare_same_kind(v, bound) == Some(Ordering::Greater))
                    }
                    Comparison::Exists(wanted) => value.is_some() == *wanted,
                }
            }
        }
    }

    /// Compile to a SQLite condition over a JSON `body` column / 编译为 SQLite 条件
    ///
    /// Appends the condition text to `sql` and its parameters to `params`, in order.
    pub fn to_sql(&self, sql: &mut String, params: &mut Vec<SqlParam>) {
        match self {
            Predicate::MatchAll => sql.push_str("1"),
            Predicate::And(items) => push_joined(items, " AND ", "1", sql, params),
            Predicate::Or(items) => push_joined(items, " OR ", "0", sql, params),
            Predicate::Compare { field, op } => {
                let path = json_path(field);
                match op {
                    Comparison::Exists(true) => {
                        sql.push_str("json_type(body, ?) IS NOT NULL");
                        params.push(SqlParam::Text(path));
                    }
                    Comparison::Exists(false) => {
                        sql.push_str("json_type(body, ?) IS NULL");
                        params.push(SqlParam::Text(path));
                    }
                    Comparison::Eq(value) => push_equality(&path, value, sql, params),
                    Comparison::Ne(value) => {
                        // JSON null extracts as SQL NULL; COALESCE keeps it a mismatch
                        sql.push_str("(json_type(body, ?) IS NULL OR NOT COALESCE((");
                        params.push(SqlParam::Text(path.clone()));
                        push_equality(&path, value, sql, params);
                        sql.push_str("), 0))");
                    }
                    Comparison::Gt(value) => match scalar_param(value) {
                        Some(param @ (SqlParam::Int(_) | SqlParam::Real(_))) => {
                            sql.push_str("(json_type(body, ?) IN ('integer', 'real') AND json_extract(body, ?) > ?)");
                            params.push(SqlParam::Text(path.clone()));
                            params.push(SqlParam::Text(path));
                            params.push(param);
                        }
                        Some(param @ SqlParam::Text(_)) => {
                            sql.push_str("(json_type(body, ?) = 'text' AND json_extract(body, ?) > ?)");
                            params.push(SqlParam::Text(path.clone()));
                            params.push(SqlParam::Text(path));
                            params.push(param);
                        }
                        None => sql.push_str("0"),
                    },
                }
            }
        }
    }
}

fn push_joined(items: &[Predicate], sep: &str, empty: &str, sql: &mut String, params: &mut Vec<SqlParam>) {
    if items.is_empty() {
        sql.push_str(empty);
        return;
    }
    sql.push('(');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            sql.push_str(sep);
        }
        item.to_sql(sql, params);
    }
    sql.push(')');
}

fn push_equality(path: &str, value: &Value, sql: &mut String, params: &mut Vec<SqlParam>) {
    match value {
        Value::Null => {
            sql.push_str("json_type(body, ?) = 'null'");
            params.push(SqlParam::Text(path.to_string()));
        }
        Value::Bool(b) => {
            sql.push_str(if *b { "json_type(body, ?) = 'true'" } else { "json_type(body, ?) = 'false'" });
            params.push(SqlParam::Text(path.to_string()));
        }
        Value::Array(_) | Value::Object(_) => {
            sql.push_str("(json_type(body, ?) IN ('array', 'object') AND json_extract(body, ?) = json(?))");
            params.push(SqlParam::Text(path.to_string()));
            params.push(SqlParam::Text(path.to_string()));
            params.push(SqlParam::Text(value.to_string()));
        }
        _ => match scalar_param(value) {
            // json_extract yields booleans as 1/0 and containers as JSON text
            Some(param @ (SqlParam::Int(_) | SqlParam::Real(_))) => {
                sql.push_str("(json_type(body, ?) IN ('integer', 'real') AND json_extract(body, ?) = ?)");
                params.push(SqlParam::Text(path.to_string()));
                params.push(SqlParam::Text(path.to_string()));
                params.push(param);
            }
            Some(param @ SqlParam::Text(_)) => {
                sql.push_str("(json_type(body, ?) = 'text' AND json_extract(body, ?) = ?)");
                params.push(SqlParam::Text(path.to_string()));
                params.push(SqlParam::Text(path.to_string()));
                params.push(param);
            }
            None => sql.push_str("0"),
        },
    }
}

fn scalar_param(value: &Value) -> Option<SqlParam> {
    match value {
        Value::String(s) => Some(SqlParam::Text(s.clone())),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(SqlParam::Int(i)),
            None => n.as_f64().map(SqlParam::Real),
        },
        _ => None,
    }
}

/// Dotted field name to a quoted SQLite JSON path: `a.b c` -> `$."a"."b c"`
pub fn json_path(field: &str) -> String {
    let mut path = String::from("$");
    for segment in field.split('.') {
        path.push_str(".\"");
        path.push_str(&segment.replace('"', "\\\""));
        path.push('"');
    }
    path
}

/// Resolve a dotted field name against nested objects / 解析点分字段路径
pub fn lookup_path<'a>(doc: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    let mut segments = field.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

fn compare_same_kind(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_equality_is_type_strict() {
        let d = doc(json!({"NIK": 3201, "NAMA": "3201"}));
        assert!(Predicate::eq("NIK", 3201).matches(&d));
        assert!(!Predicate::eq("NIK", "3201").matches(&d));
        assert!(Predicate::eq("NAMA", "3201").matches(&d));
        assert!(Predicate::eq("NIK", json!(3201.0)).matches(&d));
    }

    #[test]
    fn test_not_equal_matches_missing_field() {
        let d = doc(json!({"email": "-"}));
        assert!(!Predicate::ne("email", "-").matches(&d));
        assert!(Predicate::ne("Hp", -1).matches(&d));
    }

    #[test]
    fn test_greater_than_brackets_types() {
        let d = doc(json!({"Tagihan Pokok": 20000000, "s": "20000000"}));
        assert!(Predicate::gt("Tagihan Pokok", 10000000).matches(&d));
        assert!(!Predicate::gt("s", 10000000).matches(&d));
        assert!(!Predicate::gt("missing", 0).matches(&d));
    }

    #[test]
    fn test_exists_and_nested_paths() {
        let d = doc(json!({"product": {"fundname": "ALPHA"}, "n": null}));
        assert!(Predicate::compare("n", Comparison::Exists(true)).matches(&d));
        assert!(Predicate::eq("product.fundname", "ALPHA").matches(&d));
        assert!(Predicate::compare("product.code", Comparison::Exists(false)).matches(&d));
    }

    #[test]
    fn test_boolean_composition() {
        let d = doc(json!({"a": 1}));
        assert!(Predicate::MatchAll.matches(&d));
        assert!(Predicate::Or(vec![Predicate::eq("a", 2), Predicate::eq("a", 1)]).matches(&d));
        assert!(!Predicate::And(vec![Predicate::eq("a", 1), Predicate::eq("b", 1)]).matches(&d));
        assert!(!Predicate::Or(vec![]).matches(&d));
    }

    #[test]
    fn test_json_path_quotes_segments() {
        assert_eq!(json_path("Tagihan Pokok"), "$.\"Tagihan Pokok\"");
        assert_eq!(json_path("product.fundname"), "$.\"product\".\"fundname\"");
    }

    #[test]
    fn test_sql_equality_checks_json_type() {
        let mut sql = String::new();
        let mut params = Vec::new();
        Predicate::eq("NIK", 1).to_sql(&mut sql, &mut params);
        assert!(sql.contains("IN ('integer', 'real')"), "{}", sql);

        sql.clear();
        params.clear();
        Predicate::eq("NAMA", "X").to_sql(&mut sql, &mut params);
        assert!(sql.contains("= 'text'"), "{}", sql);
        assert_eq!(sql.matches('?').count(), params.len());
    }

    #[test]
    fn test_sql_compilation_orders_params() {
        let predicate = Predicate::And(vec![
            Predicate::ne("Hp", -1),
            Predicate::gt("Tagihan Pokok", 10000000),
        ]);
        let mut sql = String::new();
        let mut params = Vec::new();
        predicate.to_sql(&mut sql, &mut params);

        assert_eq!(sql.matches('?').count(), params.len());
        assert_eq!(params[0], SqlParam::Text("$.\"Hp\"".to_string()));
        assert_eq!(params[3], SqlParam::Int(-1));
        assert_eq!(params.last(), Some(&SqlParam::Int(10000000)));
    }
}
