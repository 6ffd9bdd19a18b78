use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, debug_span, warn};

use crate::bridge::customers::{build_customer_bridge, CustomerBridge};
use crate::bridge::mrr::{build_mrr_bridge, MrrBridge};
use crate::efficiency::payback::{build_efficiency, has_net_loss, EfficiencySeries};
use crate::error::SaasMetricsError;
use crate::events::stats::{build_event_stats, EventStats};
use crate::growth::arr::{build_growth, GrowthSeries};
use crate::retention::dollar::{build_retention, RetentionSeries};
use crate::revenue::classify::MovementGrid;
use crate::revenue::matrix::{CustomerRecord, RevenueMatrix};
use crate::types::{with_metadata, ComputationOutput, MaybeMoney, Money, MonthKey, Multiple, Rate};
use crate::validation::validate_input;
use crate::SaasMetricsResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Input for the subscription-metrics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsInput {
    /// One row per customer, each with one revenue value per month
    pub customers: Vec<CustomerRecord>,
    /// The month axis, aligned 1:1 with every revenue row
    pub dates: Vec<MonthKey>,
    /// Optional monthly net loss; missing months are null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_loss: Option<Vec<MaybeMoney>>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Every metric series on the shared month axis. All vectors have
/// `dates.len()` entries; `null` means undefined for that month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub dates: Vec<MonthKey>,

    // MRR bridge
    pub begin_mrr: Vec<Money>,
    pub new_mrr: Vec<Money>,
    pub upgrade_mrr: Vec<Money>,
    pub downgrade_mrr: Vec<Money>,
    pub churn_mrr: Vec<Money>,
    pub end_mrr: Vec<Money>,

    // Growth
    pub arr: Vec<Money>,
    pub mrr: Vec<Money>,
    pub new_arr: Vec<MaybeMoney>,
    pub yoy_growth: Vec<Option<Rate>>,
    pub max_customer_win: Vec<MaybeMoney>,
    pub avg_customer_win: Vec<MaybeMoney>,

    // Retention
    pub ttm_ndr: Vec<Option<Rate>>,
    pub ttm_gdr: Vec<Option<Rate>>,
    pub cohort_ndr: Vec<Option<Rate>>,
    pub cohort_gdr: Vec<Option<Rate>>,

    // Event statistics
    pub upgrade_count: Vec<usize>,
    pub downgrade_count: Vec<usize>,
    pub max_upgrade: Vec<MaybeMoney>,
    pub avg_upgrade: Vec<MaybeMoney>,
    pub max_downgrade: Vec<MaybeMoney>,
    pub avg_downgrade: Vec<MaybeMoney>,
    pub max_churn: Vec<MaybeMoney>,
    pub avg_churn: Vec<MaybeMoney>,

    // Customer bridge
    pub begin_customers: Vec<i64>,
    pub new_customers: Vec<i64>,
    pub churned_customers: Vec<i64>,
    pub end_customers: Vec<i64>,
    pub acv: Vec<MaybeMoney>,
    pub largest_customer: Vec<MaybeMoney>,
    pub max_concentration: Vec<Option<Rate>>,
    pub gross_customer_retention: Vec<Option<Rate>>,
    pub customer_growth: Vec<Option<Rate>>,

    // Efficiency: absent unless a net-loss series with data was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_loss: Option<Vec<MaybeMoney>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttm_new_arr_over_loss: Option<Vec<Option<Multiple>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttm_payback: Option<Vec<Option<Multiple>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub six_month_new_arr_over_loss: Option<Vec<Option<Multiple>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub six_month_payback: Option<Vec<Option<Multiple>>>,
}

impl MetricsResult {
    pub fn num_months(&self) -> usize {
        self.dates.len()
    }

    pub fn has_efficiency(&self) -> bool {
        self.ttm_new_arr_over_loss.is_some()
    }
}

/// Headline figures for the latest month on the axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub month: MonthKey,
    pub arr: Money,
    pub mrr: Money,
    /// new + upgrade + downgrade + churn in the latest month
    pub net_new_mrr: Money,
    pub end_customers: i64,
    pub acv: MaybeMoney,
    pub yoy_growth: Option<Rate>,
    /// Latest month with a defined value, if any
    pub ttm_ndr: Option<Rate>,
    pub ttm_gdr: Option<Rate>,
    pub max_concentration: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttm_payback: Option<Multiple>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Run the full pipeline over already-validated inputs.
///
/// Stages run strictly in order (classification, MRR bridge, growth,
/// retention, event statistics, customer bridge, efficiency); each reads only
/// the raw inputs and the outputs of earlier stages. Total over any input:
/// undefined values come back as `None`, never as an error.
pub fn build_metrics(
    matrix: &RevenueMatrix,
    dates: &[MonthKey],
    net_loss: Option<&[MaybeMoney]>,
) -> MetricsResult {
    let grid = MovementGrid::build(matrix);
    debug!(
        customers = grid.num_customers(),
        months = grid.num_months(),
        "classified revenue movements"
    );

    let bridge = build_mrr_bridge(&grid);
    let growth = build_growth(&bridge, &grid);
    let retention = build_retention(&bridge, matrix);
    let events = build_event_stats(&grid);
    let customers = build_customer_bridge(&grid, &bridge, &growth, matrix);
    debug!("built bridge, growth, retention, event and customer series");

    let efficiency = net_loss
        .filter(|s| has_net_loss(Some(*s)))
        .map(|s| build_efficiency(&bridge, &growth, s));
    debug!(efficiency = efficiency.is_some(), "built efficiency series");

    assemble(dates, bridge, growth, retention, events, customers, efficiency)
}

fn assemble(
    dates: &[MonthKey],
    bridge: MrrBridge,
    growth: GrowthSeries,
    retention: RetentionSeries,
    events: EventStats,
    customers: CustomerBridge,
    efficiency: Option<EfficiencySeries>,
) -> MetricsResult {
    let MrrBridge {
        begin_mrr,
        new_mrr,
        upgrade_mrr,
        downgrade_mrr,
        churn_mrr,
        end_mrr,
    } = bridge;
    let GrowthSeries {
        arr,
        mrr,
        new_arr,
        yoy_growth,
        max_customer_win,
        avg_customer_win,
    } = growth;
    let RetentionSeries {
        ttm_ndr,
        ttm_gdr,
        cohort_ndr,
        cohort_gdr,
    } = retention;
    let EventStats {
        upgrade_count,
        downgrade_count,
        max_upgrade,
        avg_upgrade,
        max_downgrade,
        avg_downgrade,
        max_churn,
        avg_churn,
    } = events;
    let CustomerBridge {
        begin_customers,
        new_customers,
        churned_customers,
        end_customers,
        acv,
        largest_customer,
        max_concentration,
        gross_customer_retention,
        customer_growth,
    } = customers;

    let (
        net_loss,
        ttm_new_arr_over_loss,
        ttm_payback,
        six_month_new_arr_over_loss,
        six_month_payback,
    ) = match efficiency {
        Some(e) => (
            Some(e.net_loss),
            Some(e.ttm_new_arr_over_loss),
            Some(e.ttm_payback),
            Some(e.six_month_new_arr_over_loss),
            Some(e.six_month_payback),
        ),
        None => (None, None, None, None, None),
    };

    MetricsResult {
        dates: dates.to_vec(),
        begin_mrr,
        new_mrr,
        upgrade_mrr,
        downgrade_mrr,
        churn_mrr,
        end_mrr,
        arr,
        mrr,
        new_arr,
        yoy_growth,
        max_customer_win,
        avg_customer_win,
        ttm_ndr,
        ttm_gdr,
        cohort_ndr,
        cohort_gdr,
        upgrade_count,
        downgrade_count,
        max_upgrade,
        avg_upgrade,
        max_downgrade,
        avg_downgrade,
        max_churn,
        avg_churn,
        begin_customers,
        new_customers,
        churned_customers,
        end_customers,
        acv,
        largest_customer,
        max_concentration,
        gross_customer_retention,
        customer_growth,
        net_loss,
        ttm_new_arr_over_loss,
        ttm_payback,
        six_month_new_arr_over_loss,
        six_month_payback,
    }
}

/// Headline view of the latest month. `None` for an empty axis.
pub fn latest_snapshot(result: &MetricsResult) -> Option<MetricsSnapshot> {
    let m = result.num_months().checked_sub(1)?;
    Some(MetricsSnapshot {
        month: result.dates[m],
        arr: result.arr[m],
        mrr: result.mrr[m],
        net_new_mrr: result.end_mrr[m] - result.begin_mrr[m],
        end_customers: result.end_customers[m],
        acv: result.acv[m],
        yoy_growth: result.yoy_growth[m],
        ttm_ndr: last_defined(&result.ttm_ndr),
        ttm_gdr: last_defined(&result.ttm_gdr),
        max_concentration: result.max_concentration[m],
        ttm_payback: result.ttm_payback.as_deref().and_then(|s| last_defined(s)),
    })
}

fn last_defined<T: Copy>(series: &[Option<T>]) -> Option<T> {
    series.iter().rev().find_map(|v| *v)
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Validate `input`, run the engine, and wrap the series with methodology,
/// assumptions and warnings.
pub fn compute_saas_metrics(
    input: &MetricsInput,
) -> SaasMetricsResult<ComputationOutput<MetricsResult>> {
    let start = Instant::now();
    let span = debug_span!(
        "compute_saas_metrics",
        customers = input.customers.len(),
        months = input.dates.len()
    );
    let _guard = span.enter();

    let warnings = validate_input(input)?;
    for w in &warnings {
        warn!("{w}");
    }

    let matrix = RevenueMatrix::from_records(input.customers.clone(), input.dates.len());
    let result = build_metrics(&matrix, &input.dates, input.net_loss.as_deref());

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "SaaS subscription metrics: MRR bridge, TTM and cohort dollar retention, customer bridge, net-loss efficiency",
        &serde_json::json!({
            "customers": input.customers.len(),
            "months": input.dates.len(),
            "first_month": input.dates.first().map(MonthKey::label),
            "last_month": input.dates.last().map(MonthKey::label),
            "efficiency_included": result.has_efficiency(),
            "ttm_window_months": crate::series::TTM_WINDOW,
            "cohort_lookback_months": crate::series::YEAR_LOOKBACK,
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Like [`compute_saas_metrics`] but returns only the latest-month headline.
pub fn compute_snapshot(
    input: &MetricsInput,
) -> SaasMetricsResult<ComputationOutput<MetricsSnapshot>> {
    let start = Instant::now();
    let full = compute_saas_metrics(input)?;
    let snapshot = latest_snapshot(&full.result).ok_or_else(|| {
        SaasMetricsError::InsufficientData("Month axis is empty".to_string())
    })?;

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Latest-month SaaS headline metrics",
        &full.assumptions,
        full.warnings,
        elapsed,
        snapshot,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
