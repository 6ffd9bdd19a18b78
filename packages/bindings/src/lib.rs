use napi::Result as NapiResult;
use napi_derive::napi;

use saas_metrics_core::metrics::MetricsInput;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_saas_metrics(input_json: String) -> NapiResult<String> {
    let input: MetricsInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        saas_metrics_core::metrics::compute_saas_metrics(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn metrics_snapshot(input_json: String) -> NapiResult<String> {
    let input: MetricsInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = saas_metrics_core::metrics::compute_snapshot(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

#[napi]
pub fn parse_revenue_table(csv_text: String) -> NapiResult<String> {
    let parsed =
        saas_metrics_core::ingest::parse_revenue_csv(&csv_text).map_err(to_napi_error)?;
    serde_json::to_string(&parsed).map_err(to_napi_error)
}

/// Parse a revenue table and compute every metric in one call. Table
/// warnings are listed ahead of the engine's.
#[napi]
pub fn compute_from_table(csv_text: String) -> NapiResult<String> {
    let parsed =
        saas_metrics_core::ingest::parse_revenue_csv(&csv_text).map_err(to_napi_error)?;
    let mut output = saas_metrics_core::metrics::compute_saas_metrics(&parsed.input)
        .map_err(to_napi_error)?;
    let mut warnings = parsed.warnings;
    warnings.append(&mut output.warnings);
    output.warnings = warnings;
    serde_json::to_string(&output).map_err(to_napi_error)
}
