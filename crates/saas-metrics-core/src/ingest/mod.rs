//! Spreadsheet ingestion: turns a customer-by-month revenue table (CSV) into
//! a validated [`MetricsInput`](crate::metrics::MetricsInput).

pub mod headers;
pub mod table;

pub use headers::parse_month_header;
pub use table::{parse_revenue_csv, parse_revenue_table, ParsedTable};
