pub mod error;
pub mod types;

pub mod bridge;
pub mod efficiency;
pub mod events;
pub mod growth;
pub mod metrics;
pub mod retention;
pub mod revenue;
pub mod series;
pub mod validation;

#[cfg(feature = "ingest")]
pub mod ingest;

pub use error::SaasMetricsError;
pub use metrics::{
    build_metrics, compute_saas_metrics, compute_snapshot, latest_snapshot, MetricsInput,
    MetricsResult, MetricsSnapshot,
};
pub use revenue::matrix::{CustomerRecord, RevenueMatrix};
pub use types::*;

/// Standard result type for all saas-metrics operations
pub type SaasMetricsResult<T> = Result<T, SaasMetricsError>;
