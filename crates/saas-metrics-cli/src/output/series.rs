//! Helpers for turning the serialized metrics envelope into month rows.

use serde_json::{Map, Value};

/// The `result` object of an envelope, or the value itself.
pub fn result_object(value: &Value) -> Option<&Map<String, Value>> {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
        .as_object()
}

/// Month labels when `result` is a full series set (has a `dates` array).
pub fn month_labels(result: &Map<String, Value>) -> Option<Vec<String>> {
    let dates = result.get("dates")?.as_array()?;
    Some(dates.iter().map(format_month).collect())
}

/// Every key whose value is an array as long as the month axis, in the
/// map's key order (alphabetical), excluding `dates`.
pub fn series_keys(result: &Map<String, Value>, months: usize) -> Vec<&str> {
    result
        .iter()
        .filter(|(k, v)| {
            k.as_str() != "dates" && v.as_array().is_some_and(|a| a.len() == months)
        })
        .map(|(k, _)| k.as_str())
        .collect()
}

/// `{year, month}` as `YYYY-MM`.
pub fn format_month(value: &Value) -> String {
    match (
        value.get("year").and_then(Value::as_i64),
        value.get("month").and_then(Value::as_i64),
    ) {
        (Some(y), Some(m)) => format!("{:04}-{:02}", y, m),
        _ => format_cell(value),
    }
}

/// Scalar formatting shared by the table and CSV writers. Null prints empty.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Object(_) if value.get("year").is_some() => format_month(value),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Cell `month` of series `key`.
pub fn cell(result: &Map<String, Value>, key: &str, month: usize) -> String {
    result
        .get(key)
        .and_then(|v| v.as_array())
        .and_then(|a| a.get(month))
        .map(format_cell)
        .unwrap_or_default()
}
