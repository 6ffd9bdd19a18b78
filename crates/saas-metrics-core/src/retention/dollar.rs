use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bridge::mrr::MrrBridge;
use crate::revenue::matrix::RevenueMatrix;
use crate::series::{safe_ratio, window_sum, TTM_WINDOW, YEAR_LOOKBACK};
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Dollar retention over a trailing window and over a fixed 12-month cohort.
/// All four series are null before month 12 and on a zero base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionSeries {
    /// (base + Σ upgrade+downgrade+churn over [m-11, m]) / base,
    /// base = begin_mrr[m-11]
    pub ttm_ndr: Vec<Option<Rate>>,
    /// (base + Σ downgrade+churn over [m-11, m]) / base
    pub ttm_gdr: Vec<Option<Rate>>,
    /// Σ rev(c, m) over the cohort active in m-12, / end_mrr[m-12]
    pub cohort_ndr: Vec<Option<Rate>>,
    /// Σ min(rev(c, m), rev(c, m-12)) over the same cohort, / end_mrr[m-12]
    pub cohort_gdr: Vec<Option<Rate>>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub fn build_retention(bridge: &MrrBridge, matrix: &RevenueMatrix) -> RetentionSeries {
    let n = bridge.len();
    let retained: Vec<Money> = (0..n).map(|m| bridge.retained_delta(m)).collect();
    let contraction: Vec<Money> = (0..n).map(|m| bridge.gross_loss(m)).collect();

    let mut ttm_ndr = Vec::with_capacity(n);
    let mut ttm_gdr = Vec::with_capacity(n);
    let mut cohort_ndr = Vec::with_capacity(n);
    let mut cohort_gdr = Vec::with_capacity(n);

    for m in 0..n {
        if m < YEAR_LOOKBACK {
            ttm_ndr.push(None);
            ttm_gdr.push(None);
            cohort_ndr.push(None);
            cohort_gdr.push(None);
            continue;
        }

        let base = bridge.begin_mrr[m + 1 - TTM_WINDOW];
        ttm_ndr.push(trailing_ratio(&retained, m, base));
        ttm_gdr.push(trailing_ratio(&contraction, m, base));

        let (ndr, gdr) = cohort_ratios(matrix, m, bridge.end_mrr[m - YEAR_LOOKBACK]);
        cohort_ndr.push(ndr);
        cohort_gdr.push(gdr);
    }

    RetentionSeries {
        ttm_ndr,
        ttm_gdr,
        cohort_ndr,
        cohort_gdr,
    }
}

fn trailing_ratio(movements: &[Money], month: usize, base: Money) -> Option<Rate> {
    if base.is_zero() {
        return None;
    }
    let moved = window_sum(movements, month, TTM_WINDOW)?;
    safe_ratio(moved + base, base)
}

/// Net and gross retention of the customers that were paying exactly twelve
/// months before `month`.
fn cohort_ratios(
    matrix: &RevenueMatrix,
    month: usize,
    cohort_base: Money,
) -> (Option<Rate>, Option<Rate>) {
    if cohort_base.is_zero() {
        return (None, None);
    }
    let now = month as isize;
    let then = now - YEAR_LOOKBACK as isize;

    let mut retained = Decimal::ZERO;
    let mut capped = Decimal::ZERO;
    for c in 0..matrix.num_customers() {
        let past = matrix.rev(c, then);
        if past <= Decimal::ZERO {
            continue;
        }
        let current = matrix.rev(c, now);
        retained += current;
        capped += current.min(past);
    }

    (
        safe_ratio(retained, cohort_base),
        safe_ratio(capped, cohort_base),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
