#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scoring rubrics and derived-metric formulas.
//!
//! Pure, deterministic functions: inspection checklist scoring, the
//! complaint-resolution performance score, scheme achievement rates and
//! fund metrics. All point tables and constants come from an injected
//! [`ScoringRubric`] rather than literals at call sites, so a rubric change
//! is one edit to `rubric.toml`.

pub mod complaint;
pub mod fund;
pub mod inspection;
pub mod rubric;
pub mod survey;

pub use complaint::{ComplaintScore, ComplaintStats, RankedPerformance, rank_by_performance};
pub use inspection::{CategoryPoints, InspectionScore, score_inspection};
pub use rubric::ScoringRubric;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Errors that can occur while loading a rubric.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// The rubric TOML could not be parsed.
    #[error("Rubric parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The rubric parsed but is internally inconsistent.
    #[error("Invalid rubric: {message}")]
    InvalidRubric {
        /// Description of the inconsistency.
        message: String,
    },
}

/// Rounds to 2 decimal places, halves away from zero, and always carries
/// exactly two fractional digits so `100` renders as `100.00`.
///
/// This is the single rounding rule for every reported score and
/// percentage.
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// `(part / whole) * 100` at full precision, defined as zero when `whole`
/// is zero or negative.
#[must_use]
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part / whole * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(dec!(66.665)), dec!(66.67));
        assert_eq!(round2(dec!(66.664)), dec!(66.66));
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round2(dec!(75)), dec!(75.00));
    }

    #[test]
    fn round2_always_renders_two_places() {
        assert_eq!(round2(dec!(100)).to_string(), "100.00");
        assert_eq!(round2(dec!(2.5)).to_string(), "2.50");
        assert_eq!(round2(Decimal::ZERO).to_string(), "0.00");
        assert_eq!(round2(dec!(66.665)).to_string(), "66.67");
    }

    #[test]
    fn percentage_of_zero_whole_is_zero() {
        assert_eq!(percentage(dec!(5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percentage(dec!(2), dec!(3)).round_dp(4), dec!(66.6667));
        assert_eq!(percentage(dec!(3), dec!(4)), dec!(75));
    }
}
