use rust_decimal::Decimal;

use crate::error::SaasMetricsError;
use crate::metrics::MetricsInput;
use crate::series::{HALF_YEAR_WINDOW, YEAR_LOOKBACK};
use crate::SaasMetricsResult;

/// Check `input` against the shape the engine relies on. Hard violations are
/// errors; conditions that only make some series null come back as warnings.
pub fn validate_input(input: &MetricsInput) -> SaasMetricsResult<Vec<String>> {
    let mut warnings: Vec<String> = Vec::new();
    let num_months = input.dates.len();

    if num_months == 0 {
        return Err(SaasMetricsError::InvalidInput {
            field: "dates".into(),
            reason: "Month axis must contain at least one month".into(),
        });
    }

    if let Some((i, bad)) = input.dates.iter().enumerate().find(|(_, d)| !d.is_valid()) {
        return Err(SaasMetricsError::DateError(format!(
            "dates[{i}] has month {} (expected 1-12)",
            bad.month
        )));
    }

    if input.customers.is_empty() {
        return Err(SaasMetricsError::InsufficientData(
            "At least one customer is required".into(),
        ));
    }

    for (i, customer) in input.customers.iter().enumerate() {
        if customer.revenue.len() != num_months {
            return Err(SaasMetricsError::InvalidInput {
                field: format!("customers[{i}].revenue"),
                reason: format!(
                    "'{}' has {} values but the month axis has {}",
                    customer.name,
                    customer.revenue.len(),
                    num_months
                ),
            });
        }
        if let Some(m) = customer.revenue.iter().position(|v| *v < Decimal::ZERO) {
            return Err(SaasMetricsError::InvalidInput {
                field: format!("customers[{i}].revenue[{m}]"),
                reason: format!("'{}' has negative revenue", customer.name),
            });
        }
    }

    let any_positive = input
        .customers
        .iter()
        .any(|c| c.revenue.iter().any(|v| *v > Decimal::ZERO));
    if !any_positive {
        return Err(SaasMetricsError::InsufficientData(
            "No customer has positive revenue in any month".into(),
        ));
    }

    if let Some(net_loss) = &input.net_loss {
        if net_loss.len() != num_months {
            return Err(SaasMetricsError::InvalidInput {
                field: "net_loss".into(),
                reason: format!(
                    "Has {} entries but the month axis has {}",
                    net_loss.len(),
                    num_months
                ),
            });
        }
        if net_loss.iter().all(Option::is_none) {
            warnings.push("Net loss series has no values; efficiency metrics omitted".into());
        }
    }

    if let Some(gap) = input
        .dates
        .windows(2)
        .find(|pair| pair[0].next() != pair[1])
    {
        warnings.push(format!(
            "Month axis is not consecutive ({} is followed by {}); trailing windows count columns, not calendar months",
            gap[0], gap[1]
        ));
    }

    if num_months <= YEAR_LOOKBACK {
        warnings.push(format!(
            "Only {num_months} months of history; growth, retention and TTM series need at least {}",
            YEAR_LOOKBACK + 1
        ));
    }
    if input.net_loss.is_some() && num_months < HALF_YEAR_WINDOW {
        warnings.push(format!(
            "6-month efficiency needs at least {HALF_YEAR_WINDOW} months of history"
        ));
    }

    Ok(warnings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
