//! The `fund-metrics` subcommand.

use rust_decimal::Decimal;
use sanitation_formula::ScoringRubric;
use sanitation_formula::fund::{average_cost_per_household, fund_utilization_rate, to_crores};
use serde::Serialize;

/// Derived fund figures. Amounts are in Crores, rates in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundSummary {
    pub funds_sanctioned_crores: Decimal,
    pub work_order_crores: Decimal,
    pub utilization_rate: Decimal,
    /// Spend per household in the stored currency unit.
    pub cost_per_household: Decimal,
}

impl FundSummary {
    #[must_use]
    pub fn compute(
        funds_sanctioned: Decimal,
        work_order_amount: Decimal,
        households: u64,
        rubric: &ScoringRubric,
    ) -> Self {
        Self {
            funds_sanctioned_crores: to_crores(funds_sanctioned, rubric),
            work_order_crores: to_crores(work_order_amount, rubric),
            utilization_rate: fund_utilization_rate(work_order_amount, funds_sanctioned),
            cost_per_household: average_cost_per_household(work_order_amount, households),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn utilization_and_per_household_cost() {
        let summary = FundSummary::compute(
            dec!(50000000),
            dec!(37500000),
            1200,
            ScoringRubric::standard(),
        );
        assert_eq!(summary.funds_sanctioned_crores, dec!(5.00));
        assert_eq!(summary.work_order_crores, dec!(3.75));
        assert_eq!(summary.utilization_rate, dec!(75.00));
        assert_eq!(summary.cost_per_household, dec!(31250.00));
    }

    #[test]
    fn nothing_sanctioned_and_no_households_are_zero() {
        let summary = FundSummary::compute(Decimal::ZERO, dec!(1000), 0, ScoringRubric::standard());
        assert_eq!(summary.utilization_rate, Decimal::ZERO);
        assert_eq!(summary.cost_per_household, Decimal::ZERO);
        assert_eq!(summary.funds_sanctioned_crores.to_string(), "0.00");
    }
}
