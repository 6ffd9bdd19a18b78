use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::bridge::mrr::MrrBridge;
use crate::growth::arr::GrowthSeries;
use crate::revenue::classify::MovementGrid;
use crate::revenue::matrix::RevenueMatrix;
use crate::series::{safe_ratio, TTM_WINDOW, YEAR_LOOKBACK};
use crate::types::{MaybeMoney, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Customer-count bridge plus per-customer value and concentration series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerBridge {
    pub begin_customers: Vec<i64>,
    pub new_customers: Vec<i64>,
    /// Negative count of customers dropping to zero revenue
    pub churned_customers: Vec<i64>,
    pub end_customers: Vec<i64>,
    /// end_mrr / end_customers * 12
    pub acv: Vec<MaybeMoney>,
    /// Largest single customer's revenue, annualized
    pub largest_customer: Vec<MaybeMoney>,
    /// largest_customer / arr
    pub max_concentration: Vec<Option<Rate>>,
    /// (begin_customers[m-11] + Σ churned over [m-11, m]) / begin_customers[m-11]
    pub gross_customer_retention: Vec<Option<Rate>>,
    /// end_customers[m] / end_customers[m-12] - 1
    pub customer_growth: Vec<Option<Rate>>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub fn build_customer_bridge(
    grid: &MovementGrid,
    bridge: &MrrBridge,
    growth: &GrowthSeries,
    matrix: &RevenueMatrix,
) -> CustomerBridge {
    let n = grid.num_months();

    let new_customers: Vec<i64> = grid
        .iter_months()
        .map(|month| month.iter().filter(|mv| mv.is_new()).count() as i64)
        .collect();
    let churned_customers: Vec<i64> = grid
        .iter_months()
        .map(|month| -(month.iter().filter(|mv| mv.is_churn()).count() as i64))
        .collect();

    let mut begin_customers = Vec::with_capacity(n);
    let mut end_customers = Vec::with_capacity(n);
    let mut carried = 0i64;
    for m in 0..n {
        let begin = carried;
        let end = begin + new_customers[m] + churned_customers[m];
        begin_customers.push(begin);
        end_customers.push(end);
        carried = end;
    }

    let acv = (0..n)
        .map(|m| {
            if end_customers[m] > 0 {
                safe_ratio(bridge.end_mrr[m], Decimal::from(end_customers[m]))
                    .map(|v| v * dec!(12))
            } else {
                None
            }
        })
        .collect();

    let largest_customer: Vec<MaybeMoney> = (0..n)
        .map(|m| {
            matrix
                .column(m as isize)
                .filter(|v| *v > Decimal::ZERO)
                .max()
                .map(|v| v * dec!(12))
        })
        .collect();

    let max_concentration = (0..n)
        .map(|m| match largest_customer[m] {
            Some(largest) if growth.arr[m] > Decimal::ZERO => safe_ratio(largest, growth.arr[m]),
            _ => None,
        })
        .collect();

    let gross_customer_retention = (0..n)
        .map(|m| {
            if m < YEAR_LOOKBACK {
                return None;
            }
            let start = m + 1 - TTM_WINDOW;
            let base = begin_customers[start];
            if base == 0 {
                return None;
            }
            let churned: i64 = churned_customers[start..=m].iter().sum();
            safe_ratio(Decimal::from(churned + base), Decimal::from(base))
        })
        .collect();

    let customer_growth = (0..n)
        .map(|m| {
            if m < YEAR_LOOKBACK || end_customers[m - YEAR_LOOKBACK] <= 0 {
                return None;
            }
            safe_ratio(
                Decimal::from(end_customers[m]),
                Decimal::from(end_customers[m - YEAR_LOOKBACK]),
            )
            .map(|r| r - Decimal::ONE)
        })
        .collect();

    CustomerBridge {
        begin_customers,
        new_customers,
        churned_customers,
        end_customers,
        acv,
        largest_customer,
        max_concentration,
        gross_customer_retention,
        customer_growth,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
