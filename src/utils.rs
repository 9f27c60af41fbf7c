//! Value coercion utility functions / 取值转换工具函数

use serde_json::Value;

/// Parse a non-empty all-ASCII-digit string as i64 / 解析纯数字字符串
///
/// Returns None for empty input, any non-digit character, or values beyond i64.
pub fn parse_all_digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<i64>().ok()
}

/// Coerce a stored value to i64, 0 when not representable / 转换为 i64
pub fn value_to_i64(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

/// Coerce a stored value to i32, 0 when not representable / 转换为 i32
pub fn value_to_i32(value: Option<&Value>) -> i32 {
    i32::try_from(value_to_i64(value)).unwrap_or(0)
}
