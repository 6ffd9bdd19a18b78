use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Money;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One customer's realized recurring revenue, one entry per month on the
/// shared axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub name: String,
    pub revenue: Vec<Money>,
}

impl CustomerRecord {
    pub fn new(name: impl Into<String>, revenue: Vec<Money>) -> Self {
        Self {
            name: name.into(),
            revenue,
        }
    }
}

/// Read-only `revenue[customer][month]` view over the customer rows.
///
/// Lookups are total: anything outside the data range reads as zero, so
/// "month -1" is simply "no prior revenue".
#[derive(Debug, Clone)]
pub struct RevenueMatrix {
    customers: Vec<CustomerRecord>,
    num_months: usize,
}

impl RevenueMatrix {
    /// Wrap already-validated rows. No checks are performed here.
    pub fn from_records(customers: Vec<CustomerRecord>, num_months: usize) -> Self {
        Self {
            customers,
            num_months,
        }
    }

    pub fn num_customers(&self) -> usize {
        self.customers.len()
    }

    pub fn num_months(&self) -> usize {
        self.num_months
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.customers.iter().map(|c| c.name.as_str())
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.customers
    }

    /// Revenue of `customer` in `month`; zero outside the axis, for an unknown
    /// customer, or for a missing cell.
    pub fn rev(&self, customer: usize, month: isize) -> Money {
        if month < 0 || month as usize >= self.num_months {
            return Decimal::ZERO;
        }
        self.customers
            .get(customer)
            .and_then(|c| c.revenue.get(month as usize))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Every customer's revenue in `month`, in row order.
    pub fn column(&self, month: isize) -> impl Iterator<Item = Money> + '_ {
        (0..self.customers.len()).map(move |c| self.rev(c, month))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
