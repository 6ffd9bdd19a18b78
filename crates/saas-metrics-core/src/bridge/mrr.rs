use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::revenue::classify::{Movement, MovementGrid};
use crate::types::Money;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Month-over-month MRR bridge. Every vector has one entry per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrrBridge {
    /// Equals the previous month's ending MRR; zero in month 0
    pub begin_mrr: Vec<Money>,
    /// Revenue from customers that paid nothing the month before
    pub new_mrr: Vec<Money>,
    /// Expansion from continuing customers (>= 0)
    pub upgrade_mrr: Vec<Money>,
    /// Contraction from continuing customers (<= 0)
    pub downgrade_mrr: Vec<Money>,
    /// Revenue lost from customers dropping to zero (<= 0)
    pub churn_mrr: Vec<Money>,
    /// begin + new + upgrade + downgrade + churn
    pub end_mrr: Vec<Money>,
}

impl MrrBridge {
    pub fn len(&self) -> usize {
        self.end_mrr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.end_mrr.is_empty()
    }

    /// Net movement of continuing customers (upgrade + downgrade + churn) in
    /// `month`.
    pub fn retained_delta(&self, month: usize) -> Money {
        self.upgrade_mrr[month] + self.downgrade_mrr[month] + self.churn_mrr[month]
    }

    /// Contraction only (downgrade + churn) in `month`.
    pub fn gross_loss(&self, month: usize) -> Money {
        self.downgrade_mrr[month] + self.churn_mrr[month]
    }

    /// Net new MRR (new + upgrade + downgrade + churn) in `month`.
    pub fn net_new(&self, month: usize) -> Money {
        self.new_mrr[month] + self.retained_delta(month)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Accumulate per-customer movements into monthly totals, then run the
/// begin/end recurrence in increasing month order.
pub fn build_mrr_bridge(grid: &MovementGrid) -> MrrBridge {
    let n = grid.num_months();
    let mut new_mrr = vec![Decimal::ZERO; n];
    let mut upgrade_mrr = vec![Decimal::ZERO; n];
    let mut downgrade_mrr = vec![Decimal::ZERO; n];
    let mut churn_mrr = vec![Decimal::ZERO; n];

    for (m, movements) in grid.iter_months().enumerate() {
        for movement in movements {
            match *movement {
                Movement::New(v) => new_mrr[m] += v,
                Movement::Upgrade(v) => upgrade_mrr[m] += v,
                Movement::Downgrade(v) => downgrade_mrr[m] += v,
                Movement::Churn(v) => churn_mrr[m] += v,
                Movement::Flat => {}
            }
        }
    }

    // Sequential: each month opens at the previous month's close
    let mut begin_mrr = Vec::with_capacity(n);
    let mut end_mrr = Vec::with_capacity(n);
    let mut carried = Decimal::ZERO;
    for m in 0..n {
        let begin = carried;
        let end = begin + new_mrr[m] + upgrade_mrr[m] + downgrade_mrr[m] + churn_mrr[m];
        begin_mrr.push(begin);
        end_mrr.push(end);
        carried = end;
    }

    MrrBridge {
        begin_mrr,
        new_mrr,
        upgrade_mrr,
        downgrade_mrr,
        churn_mrr,
        end_mrr,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
