use serde_json::Value;

use super::series::{format_cell, result_object};

/// Print just the key answer value from the output.
///
/// For a series set the latest month is used. Falls back to the first
/// non-null field of the result.
pub fn print_minimal(value: &Value) {
    let priority_keys = ["arr", "mrr", "ttm_ndr", "end_customers"];

    let Some(map) = result_object(value) else {
        println!("{}", format_minimal(value));
        return;
    };

    for key in &priority_keys {
        if let Some(val) = map.get(*key).map(latest) {
            if !val.is_null() {
                println!("{}", format_minimal(val));
                return;
            }
        }
    }

    if let Some((key, val)) = map.iter().find(|(_, v)| !latest(v).is_null()) {
        println!("{}: {}", key, format_minimal(latest(val)));
    }
}

/// Last element of a series, or the value itself.
fn latest(value: &Value) -> &Value {
    match value {
        Value::Array(items) => items.last().unwrap_or(&Value::Null),
        other => other,
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => format_cell(other),
    }
}
