use clap::Args;
use serde_json::Value;
use tracing::info;

use saas_metrics_core::ingest::parse_revenue_csv;
use saas_metrics_core::metrics::{self, MetricsInput};

use crate::input;

/// Arguments shared by `metrics` and `snapshot`
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to JSON input file ({customers, dates, net_loss?})
    #[arg(long, conflicts_with = "table")]
    pub input: Option<String>,

    /// Path to a CSV revenue table (customer rows, month columns)
    #[arg(long)]
    pub table: Option<String>,
}

/// Resolve the input from `--table`, `--input`, or piped stdin. Returns any
/// warnings raised while reading a table.
fn load_input(
    args: &MetricsArgs,
) -> Result<(MetricsInput, Vec<String>), Box<dyn std::error::Error>> {
    if let Some(ref path) = args.table {
        let text = input::file::read_text(path)?;
        let parsed = parse_revenue_csv(&text)?;
        info!(
            customers = parsed.input.customers.len(),
            months = parsed.input.dates.len(),
            "parsed revenue table"
        );
        return Ok((parsed.input, parsed.warnings));
    }

    let metrics_input: MetricsInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json>, --table <file.csv> or stdin required".into());
    };
    Ok((metrics_input, Vec::new()))
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (metrics_input, table_warnings) = load_input(&args)?;
    let mut result = metrics::compute_saas_metrics(&metrics_input)?;
    prepend_warnings(&mut result.warnings, table_warnings);
    Ok(serde_json::to_value(result)?)
}

pub fn run_snapshot(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (metrics_input, table_warnings) = load_input(&args)?;
    let mut result = metrics::compute_snapshot(&metrics_input)?;
    prepend_warnings(&mut result.warnings, table_warnings);
    Ok(serde_json::to_value(result)?)
}

/// Table-reading warnings come first, ahead of the engine's own.
fn prepend_warnings(warnings: &mut Vec<String>, mut earlier: Vec<String>) {
    earlier.append(warnings);
    *warnings = earlier;
}
