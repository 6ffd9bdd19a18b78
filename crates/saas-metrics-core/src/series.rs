//! Small helpers shared by the series builders.

use rust_decimal::Decimal;

use crate::types::Money;

/// Minimum month index at which year-over-year and trailing-twelve-month
/// series become defined.
pub const YEAR_LOOKBACK: usize = 12;

/// Length of the inclusive trailing-twelve-month window.
pub const TTM_WINDOW: usize = 12;

/// Length of the inclusive half-year window used by the 6-month efficiency
/// ratios.
pub const HALF_YEAR_WINDOW: usize = 6;

/// `numerator / denominator`, or `None` when the denominator is zero.
pub fn safe_ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        None
    } else {
        numerator.checked_div(denominator)
    }
}

/// Sum of the inclusive window `[end + 1 - len, end]`. `None` if the window
/// would start before month 0.
pub fn window_sum(series: &[Money], end: usize, len: usize) -> Option<Money> {
    if len == 0 || end + 1 < len || end >= series.len() {
        return None;
    }
    Some(series[end + 1 - len..=end].iter().copied().sum())
}

/// Sum of the defined entries in the inclusive window `[end + 1 - len, end]`.
/// `None` when the window starts before month 0 or holds no defined entry.
pub fn window_sum_defined(series: &[Option<Money>], end: usize, len: usize) -> Option<Money> {
    if len == 0 || end + 1 < len || end >= series.len() {
        return None;
    }
    series[end + 1 - len..=end]
        .iter()
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(Decimal::ZERO) + v))
}

/// Maximum and arithmetic mean of `values`; both `None` when empty.
pub fn max_and_mean<I>(values: I) -> (Option<Money>, Option<Money>)
where
    I: IntoIterator<Item = Money>,
{
    let mut max: Option<Money> = None;
    let mut sum = Decimal::ZERO;
    let mut count: u64 = 0;
    for v in values {
        max = Some(match max {
            Some(m) if m >= v => m,
            _ => v,
        });
        sum += v;
        count += 1;
    }
    let mean = if count == 0 {
        None
    } else {
        Some(sum / Decimal::from(count))
    };
    (max, mean)
}
