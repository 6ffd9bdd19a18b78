use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::revenue::matrix::RevenueMatrix;
use crate::types::Money;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How one customer's revenue moved between two adjacent months.
///
/// Amounts are signed the way they enter the MRR bridge: `New` and `Upgrade`
/// are positive, `Downgrade` and `Churn` are negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Movement {
    Flat,
    /// Current revenue of a customer that paid nothing last month
    New(Money),
    /// `curr - prev`, positive
    Upgrade(Money),
    /// `curr - prev`, negative, customer still paying
    Downgrade(Money),
    /// `-prev`
    Churn(Money),
}

impl Movement {
    /// Contribution to the month's ending MRR.
    pub fn mrr_delta(&self) -> Money {
        match *self {
            Movement::Flat => Decimal::ZERO,
            Movement::New(v)
            | Movement::Upgrade(v)
            | Movement::Downgrade(v)
            | Movement::Churn(v) => v,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Movement::New(_))
    }

    pub fn is_churn(&self) -> bool {
        matches!(self, Movement::Churn(_))
    }
}

/// Classify a single (customer, month) cell from the previous and current
/// revenue.
pub fn classify(prev: Money, curr: Money) -> Movement {
    let zero = Decimal::ZERO;
    if curr > zero && prev == zero {
        Movement::New(curr)
    } else if curr > prev && prev > zero {
        Movement::Upgrade(curr - prev)
    } else if curr < prev && curr > zero {
        Movement::Downgrade(curr - prev)
    } else if curr == zero && prev > zero {
        Movement::Churn(-prev)
    } else {
        Movement::Flat
    }
}

/// The `[month][customer]` classification tensor, computed once and shared by
/// every downstream builder.
#[derive(Debug, Clone)]
pub struct MovementGrid {
    months: Vec<Vec<Movement>>,
    num_customers: usize,
}

impl MovementGrid {
    pub fn build(matrix: &RevenueMatrix) -> Self {
        let num_customers = matrix.num_customers();
        let months = (0..matrix.num_months())
            .map(|m| {
                let m = m as isize;
                (0..num_customers)
                    .map(|c| classify(matrix.rev(c, m - 1), matrix.rev(c, m)))
                    .collect()
            })
            .collect();
        Self {
            months,
            num_customers,
        }
    }

    pub fn num_months(&self) -> usize {
        self.months.len()
    }

    pub fn num_customers(&self) -> usize {
        self.num_customers
    }

    /// All customers' movements in `month`. Empty for an out-of-range month.
    pub fn month(&self, month: usize) -> &[Movement] {
        self.months.get(month).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter_months(&self) -> impl Iterator<Item = &[Movement]> {
        self.months.iter().map(Vec::as_slice)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
