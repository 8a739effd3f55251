//! Fund metrics and presentation conversions.
//!
//! Amounts are stored in the base currency unit. Crores are a display unit
//! only and are applied after aggregation.

use rust_decimal::Decimal;

use crate::{ScoringRubric, percentage, round2};

/// Converts a base-unit amount to Crores, rounded to 2 decimal places.
#[must_use]
pub fn to_crores(amount: Decimal, rubric: &ScoringRubric) -> Decimal {
    let divisor = Decimal::from(rubric.presentation.crore_divisor);
    if divisor <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round2(amount / divisor)
}

/// Share of sanctioned funds committed to work orders, 0 when nothing was
/// sanctioned.
#[must_use]
pub fn fund_utilization_rate(work_order_amount: Decimal, funds_sanctioned: Decimal) -> Decimal {
    round2(percentage(work_order_amount, funds_sanctioned))
}

/// Spend per household, 0 when there are no households.
#[must_use]
pub fn average_cost_per_household(total_cost: Decimal, households: u64) -> Decimal {
    if households == 0 {
        return Decimal::ZERO;
    }
    round2(total_cost / Decimal::from(households))
}
