use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;

use crate::error::SaasMetricsError;
use crate::ingest::headers::parse_month_header;
use crate::metrics::MetricsInput;
use crate::revenue::matrix::CustomerRecord;
use crate::types::{MaybeMoney, MonthKey};
use crate::validation::validate_input;
use crate::SaasMetricsResult;

/// Row label (case-insensitive) that carries the net-loss series instead of a
/// customer.
pub const NET_LOSS_LABEL: &str = "net loss";

/// Result of parsing a revenue table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedTable {
    pub input: MetricsInput,
    pub warnings: Vec<String>,
}

/// Parse CSV text. See [`parse_revenue_table`].
pub fn parse_revenue_csv(text: &str) -> SaasMetricsResult<ParsedTable> {
    parse_revenue_table(text.as_bytes())
}

/// Parse a customer-by-month revenue table.
///
/// The first row is the header: column 0 names the customer, and every other
/// column whose header reads as a month becomes a point on the month axis.
/// Other columns are skipped. Blank cells are zero revenue; negative amounts
/// are coerced to zero. A row labelled "Net Loss" becomes the net-loss series.
pub fn parse_revenue_table<R: Read>(reader: R) -> SaasMetricsResult<ParsedTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = rdr.records();
    let header = match records.next() {
        Some(rec) => rec?,
        None => {
            return Err(SaasMetricsError::InsufficientData(
                "Revenue table is empty".into(),
            ))
        }
    };

    let mut warnings: Vec<String> = Vec::new();
    let mut month_columns: Vec<(usize, MonthKey)> = Vec::new();
    for (col, raw) in header.iter().enumerate().skip(1) {
        match parse_month_header(raw) {
            Some(key) => month_columns.push((col, key)),
            None if raw.is_empty() => {}
            None => warnings.push(format!("Skipped non-month column '{raw}'")),
        }
    }
    if month_columns.is_empty() {
        return Err(SaasMetricsError::DateError(
            "No column header could be read as a month".into(),
        ));
    }
    let dates: Vec<MonthKey> = month_columns.iter().map(|(_, key)| *key).collect();

    let mut customers: Vec<CustomerRecord> = Vec::new();
    let mut net_loss: Option<Vec<MaybeMoney>> = None;
    let mut coerced = 0usize;

    for (idx, rec) in records.enumerate() {
        let rec = rec?;
        // 1-based, header is row 1
        let row = idx + 2;
        let name = rec.get(0).unwrap_or_default();
        if name.is_empty() {
            if month_columns
                .iter()
                .any(|(col, _)| !rec.get(*col).unwrap_or_default().is_empty())
            {
                warnings.push(format!("Skipped row {row} without a customer name"));
            }
            continue;
        }

        let mut cells: Vec<MaybeMoney> = Vec::with_capacity(month_columns.len());
        for (col, _) in &month_columns {
            let raw = rec.get(*col).unwrap_or_default();
            let value = parse_amount(raw).map_err(|reason| SaasMetricsError::ParseError {
                row,
                column: col + 1,
                reason,
            })?;
            cells.push(value);
        }

        if name.eq_ignore_ascii_case(NET_LOSS_LABEL) {
            if net_loss.is_some() {
                warnings.push(format!("Duplicate net loss row {row} ignored"));
            } else {
                net_loss = Some(cells);
            }
            continue;
        }

        let revenue = cells
            .into_iter()
            .map(|v| match v {
                Some(v) if v < Decimal::ZERO => {
                    coerced += 1;
                    Decimal::ZERO
                }
                Some(v) => v,
                None => Decimal::ZERO,
            })
            .collect();
        customers.push(CustomerRecord::new(name, revenue));
    }

    if coerced > 0 {
        warnings.push(format!("{coerced} negative revenue cell(s) set to zero"));
    }

    let input = MetricsInput {
        customers,
        dates,
        net_loss,
    };
    validate_input(&input)?;

    Ok(ParsedTable { input, warnings })
}

/// Read a money cell: `$1,200.50`, `(300)` and `-300` are accepted; blank and
/// `-` mean no value.
fn parse_amount(raw: &str) -> Result<MaybeMoney, String> {
    let mut s: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if s.is_empty() || s == "-" {
        return Ok(None);
    }

    let negative = s.starts_with('(') && s.ends_with(')');
    if negative {
        s = s[1..s.len() - 1].to_string();
    }

    let value = Decimal::from_str(&s).map_err(|_| format!("'{raw}' is not a number"))?;
    Ok(Some(if negative { -value } else { value }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
