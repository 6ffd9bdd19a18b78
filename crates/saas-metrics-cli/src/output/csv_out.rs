use serde_json::{Map, Value};
use std::io;

use super::series::{cell, format_cell, month_labels, result_object, series_keys};

/// Write output as CSV to stdout: one row per month for a series set,
/// otherwise a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match result_object(value) {
        Some(result) => match month_labels(result) {
            Some(months) => write_series_csv(&mut wtr, result, &months),
            None => write_fields_csv(&mut wtr, result),
        },
        None => {
            let _ = wtr.write_record([&format_cell(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_series_csv(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    result: &Map<String, Value>,
    months: &[String],
) {
    let keys = series_keys(result, months.len());

    let mut header = vec!["month"];
    header.extend(keys.iter().copied());
    let _ = wtr.write_record(&header);

    for (m, month) in months.iter().enumerate() {
        let mut row = vec![month.clone()];
        row.extend(keys.iter().map(|key| cell(result, key, m)));
        let _ = wtr.write_record(&row);
    }
}

fn write_fields_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, result: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in result {
        let _ = wtr.write_record([key.as_str(), &format_cell(val)]);
    }
}
