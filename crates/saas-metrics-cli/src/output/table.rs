use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::series::{cell, format_cell, month_labels, result_object};

/// Series shown in the month-per-row table, in column order.
const HEADLINE_SERIES: &[(&str, &str)] = &[
    ("begin_mrr", "Begin MRR"),
    ("new_mrr", "New"),
    ("upgrade_mrr", "Upgrade"),
    ("downgrade_mrr", "Downgrade"),
    ("churn_mrr", "Churn"),
    ("end_mrr", "End MRR"),
    ("arr", "ARR"),
    ("yoy_growth", "YoY"),
    ("ttm_ndr", "TTM NDR"),
    ("ttm_gdr", "TTM GDR"),
    ("end_customers", "Customers"),
    ("acv", "ACV"),
    ("ttm_payback", "TTM Payback"),
];

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    let Some(result) = result_object(value) else {
        println!("{}", value);
        return;
    };

    match month_labels(result) {
        Some(months) => print_series_table(result, &months),
        None => print_field_table(result),
    }

    if let Some(envelope) = value.as_object() {
        print_footer(envelope);
    }
}

fn print_series_table(result: &Map<String, Value>, months: &[String]) {
    let columns: Vec<&(&str, &str)> = HEADLINE_SERIES
        .iter()
        .filter(|(key, _)| result.contains_key(*key))
        .collect();

    let mut builder = Builder::default();
    let mut header = vec!["Month".to_string()];
    header.extend(columns.iter().map(|(_, label)| label.to_string()));
    builder.push_record(header);

    for (m, month) in months.iter().enumerate() {
        let mut row = vec![month.clone()];
        row.extend(columns.iter().map(|(key, _)| cell(result, key, m)));
        builder.push_record(row);
    }

    println!("{}", Table::from(builder));
}

fn print_field_table(result: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in result {
        let shown = if val.is_null() {
            "null".to_string()
        } else {
            format_cell(val)
        };
        builder.push_record([key.as_str(), &shown]);
    }
    println!("{}", Table::from(builder));
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
