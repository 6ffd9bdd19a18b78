use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::bridge::mrr::MrrBridge;
use crate::growth::arr::GrowthSeries;
use crate::series::{safe_ratio, window_sum, window_sum_defined, HALF_YEAR_WINDOW, TTM_WINDOW};
use crate::types::{MaybeMoney, Money, Multiple};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Capital-efficiency ratios driven by a monthly net-loss series.
///
/// Each ratio is `new ARR / -(Σ net loss)` over its window, and the payback
/// is its reciprocal. The net-loss sum covers only the months that carry a
/// value; a window with no values, or summing to zero, is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencySeries {
    /// The net-loss input, echoed on the month axis
    pub net_loss: Vec<MaybeMoney>,
    pub ttm_new_arr_over_loss: Vec<Option<Multiple>>,
    pub ttm_payback: Vec<Option<Multiple>>,
    pub six_month_new_arr_over_loss: Vec<Option<Multiple>>,
    pub six_month_payback: Vec<Option<Multiple>>,
}

/// A ratio and its reciprocal payback for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct RatioPoint {
    ratio: Option<Multiple>,
    payback: Option<Multiple>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the efficiency group. `net_loss` must have one entry per month;
/// months past its end read as missing.
pub fn build_efficiency(
    bridge: &MrrBridge,
    growth: &GrowthSeries,
    net_loss: &[MaybeMoney],
) -> EfficiencySeries {
    let n = bridge.len();
    let loss: Vec<MaybeMoney> = (0..n).map(|m| net_loss.get(m).copied().flatten()).collect();
    let net_new: Vec<Money> = (0..n).map(|m| bridge.net_new(m)).collect();

    let mut out = EfficiencySeries {
        net_loss: loss.clone(),
        ttm_new_arr_over_loss: Vec::with_capacity(n),
        ttm_payback: Vec::with_capacity(n),
        six_month_new_arr_over_loss: Vec::with_capacity(n),
        six_month_payback: Vec::with_capacity(n),
    };

    for m in 0..n {
        let ttm = if m + 1 >= TTM_WINDOW {
            growth.new_arr[m]
                .map(|new_arr| ratio_point(new_arr, window_sum_defined(&loss, m, TTM_WINDOW)))
                .unwrap_or_default()
        } else {
            RatioPoint::default()
        };
        out.ttm_new_arr_over_loss.push(ttm.ratio);
        out.ttm_payback.push(ttm.payback);

        let half = match window_sum(&net_new, m, HALF_YEAR_WINDOW) {
            Some(sum_new) => ratio_point(
                sum_new * dec!(12),
                window_sum_defined(&loss, m, HALF_YEAR_WINDOW),
            ),
            None => RatioPoint::default(),
        };
        out.six_month_new_arr_over_loss.push(half.ratio);
        out.six_month_payback.push(half.payback);
    }

    out
}

/// `new_arr / -(loss)`; null when no loss was recorded or it sums to zero.
/// A zero ratio keeps its value but has no payback.
fn ratio_point(new_arr: Money, loss: MaybeMoney) -> RatioPoint {
    let Some(loss) = loss.filter(|l| !l.is_zero()) else {
        return RatioPoint::default();
    };
    let ratio = safe_ratio(new_arr, loss * dec!(-1));
    let payback = ratio.and_then(|r| safe_ratio(Decimal::ONE, r));
    RatioPoint { ratio, payback }
}

/// True when `net_loss` carries at least one value, i.e. the efficiency group
/// should be produced at all.
pub fn has_net_loss(net_loss: Option<&[MaybeMoney]>) -> bool {
    net_loss.is_some_and(|s| s.iter().any(Option::is_some))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::mrr::build_mrr_bridge;
    use crate::growth::arr::build_growth;
    use crate::revenue::classify::MovementGrid;
    use crate::revenue::matrix::{CustomerRecord, RevenueMatrix};

    fn efficiency_for(row: Vec<Money>, net_loss: Vec<MaybeMoney>) -> EfficiencySeries {
        let n = row.len();
        let matrix = RevenueMatrix::from_records(vec![CustomerRecord::new("A", row)], n);
        let grid = MovementGrid::build(&matrix);
        let bridge = build_mrr_bridge(&grid);
        let growth = build_growth(&bridge, &grid);
        build_efficiency(&bridge, &growth, &net_loss)
    }

    /// 100 MRR for twelve months, then 200.
    fn stepped_row() -> Vec<Money> {
        let mut row = vec![dec!(100); 12];
        row.push(dec!(200));
        row
    }

    #[test]
    fn test_ttm_ratio_and_payback() {
        // new_arr[12] = (200 - 100) * 12 = 1200; losses -100 * 12 = -1200
        let e = efficiency_for(stepped_row(), vec![Some(dec!(-100)); 13]);
        assert!(e.ttm_new_arr_over_loss[..12].iter().all(Option::is_none));
        assert_eq!(e.ttm_new_arr_over_loss[12], Some(dec!(1)));
        assert_eq!(e.ttm_payback[12], Some(dec!(1)));
    }

    #[test]
    fn test_ttm_sums_only_defined_entries() {
        let mut loss = vec![None; 13];
        loss[12] = Some(dec!(-600));
        loss[3] = Some(dec!(-600));
        let e = efficiency_for(stepped_row(), loss);
        // window [1, 12] holds months 3 and 12: -1200
        assert_eq!(e.ttm_new_arr_over_loss[12], Some(dec!(1)));
    }

    #[test]
    fn test_ttm_null_when_window_has_no_loss() {
        let mut loss = vec![None; 13];
        loss[0] = Some(dec!(-500));
        let e = efficiency_for(stepped_row(), loss);
        // month 0 falls outside the [1, 12] window
        assert_eq!(e.ttm_new_arr_over_loss[12], None);
        assert_eq!(e.ttm_payback[12], None);
    }

    #[test]
    fn test_zero_loss_sum_is_null() {
        let mut loss = vec![Some(dec!(0)); 13];
        loss[5] = Some(dec!(10));
        loss[6] = Some(dec!(-10));
        let e = efficiency_for(stepped_row(), loss);
        assert_eq!(e.ttm_new_arr_over_loss[12], None);
    }

    #[test]
    fn test_zero_ratio_has_no_payback() {
        let e = efficiency_for(vec![dec!(100); 13], vec![Some(dec!(-50)); 13]);
        assert_eq!(e.ttm_new_arr_over_loss[12], Some(dec!(0)));
        assert_eq!(e.ttm_payback[12], None);
    }

    #[test]
    fn test_six_month_window_annualizes_by_twelve() {
        // Net new over [0, 5] = 100 (the month-0 win); * 12 = 1200.
        // Loss over the window = -100 * 6 = -600 => ratio 2, payback 0.5
        let e = efficiency_for(vec![dec!(100); 6], vec![Some(dec!(-100)); 6]);
        assert!(e.six_month_new_arr_over_loss[..5].iter().all(Option::is_none));
        assert_eq!(e.six_month_new_arr_over_loss[5], Some(dec!(2)));
        assert_eq!(e.six_month_payback[5], Some(dec!(0.5)));
    }

    #[test]
    fn test_positive_loss_is_sign_flipped() {
        let e = efficiency_for(vec![dec!(100); 6], vec![Some(dec!(100)); 6]);
        assert_eq!(e.six_month_new_arr_over_loss[5], Some(dec!(-2)));
        assert_eq!(e.six_month_payback[5], Some(dec!(-0.5)));
    }

    #[test]
    fn test_has_net_loss() {
        assert!(!has_net_loss(None));
        assert!(!has_net_loss(Some(&[None, None][..])));
        assert!(has_net_loss(Some(&[None, Some(dec!(0))][..])));
    }
}
