use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaasMetricsError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Parse error at row {row}, column {column}: {reason}")]
    ParseError {
        row: usize,
        column: usize,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for SaasMetricsError {
    fn from(e: serde_json::Error) -> Self {
        SaasMetricsError::SerializationError(e.to_string())
    }
}

#[cfg(feature = "ingest")]
impl From<csv::Error> for SaasMetricsError {
    fn from(e: csv::Error) -> Self {
        let row = e
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();
        SaasMetricsError::ParseError {
            row,
            column: 0,
            reason: e.to_string(),
        }
    }
}
