use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::bridge::mrr::MrrBridge;
use crate::revenue::classify::{Movement, MovementGrid};
use crate::series::{max_and_mean, safe_ratio, YEAR_LOOKBACK};
use crate::types::{MaybeMoney, Money, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Run-rate and growth series derived from the MRR bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSeries {
    /// end_mrr * 12
    pub arr: Vec<Money>,
    /// Ending MRR, echoed for presentation
    pub mrr: Vec<Money>,
    /// arr[m] - arr[m-12]; null before month 12
    pub new_arr: Vec<MaybeMoney>,
    /// mrr[m] / mrr[m-12] - 1; null before month 12 or on a zero base
    pub yoy_growth: Vec<Option<Rate>>,
    /// Largest opening MRR among customers won this month
    pub max_customer_win: Vec<MaybeMoney>,
    /// Mean opening MRR among customers won this month
    pub avg_customer_win: Vec<MaybeMoney>,
}

pub fn build_growth(bridge: &MrrBridge, grid: &MovementGrid) -> GrowthSeries {
    let n = bridge.len();
    let mrr = bridge.end_mrr.clone();
    let arr: Vec<Money> = mrr.iter().map(|v| *v * MONTHS_PER_YEAR).collect();

    let new_arr = (0..n)
        .map(|m| (m >= YEAR_LOOKBACK).then(|| arr[m] - arr[m - YEAR_LOOKBACK]))
        .collect();

    let yoy_growth = (0..n)
        .map(|m| {
            if m < YEAR_LOOKBACK {
                return None;
            }
            safe_ratio(mrr[m], mrr[m - YEAR_LOOKBACK]).map(|r| r - Decimal::ONE)
        })
        .collect();

    let mut max_customer_win = Vec::with_capacity(n);
    let mut avg_customer_win = Vec::with_capacity(n);
    for m in 0..n {
        let wins = grid.month(m).iter().filter_map(|mv| match mv {
            Movement::New(v) => Some(*v),
            _ => None,
        });
        let (max, mean) = max_and_mean(wins);
        max_customer_win.push(max);
        avg_customer_win.push(mean);
    }

    GrowthSeries {
        arr,
        mrr,
        new_arr,
        yoy_growth,
        max_customer_win,
        avg_customer_win,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
