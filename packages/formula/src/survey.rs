//! Annual survey scheme achievement.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sanitation_metrics_models::{Scheme, SchemeProgress};

use crate::{percentage, round2};

/// `(achievement / target) * 100`, zero for a non-positive target, never
/// negative.
#[must_use]
pub fn achievement_percentage(achievement: Decimal, target: Decimal) -> Decimal {
    percentage(achievement, target).max(Decimal::ZERO)
}

/// Overall SBMG achievement rate of one survey: total achievement over
/// total target across its schemes, unrounded.
#[must_use]
pub fn overall_achievement_rate(schemes: &[SchemeProgress]) -> Decimal {
    let (target, achievement) = schemes
        .iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(t, a), p| {
            (t + p.target, a + p.achievement)
        });
    achievement_percentage(achievement, target)
}

/// Per-scheme achievement percentages rounded to 2 decimal places.
/// Duplicate entries for the same scheme are summed first.
#[must_use]
pub fn scheme_breakdown(schemes: &[SchemeProgress]) -> BTreeMap<Scheme, Decimal> {
    let mut totals: BTreeMap<Scheme, (Decimal, Decimal)> = BTreeMap::new();
    for p in schemes {
        let entry = totals.entry(p.scheme).or_default();
        entry.0 += p.target;
        entry.1 += p.achievement;
    }

    totals
        .into_iter()
        .map(|(scheme, (target, achievement))| {
            (scheme, round2(achievement_percentage(achievement, target)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn progress(scheme: Scheme, target: Decimal, achievement: Decimal) -> SchemeProgress {
        SchemeProgress {
            scheme,
            target,
            achievement,
        }
    }

    #[test]
    fn zero_target_is_zero_not_undefined() {
        assert_eq!(achievement_percentage(dec!(5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(achievement_percentage(dec!(-5), dec!(10)), Decimal::ZERO);
        assert_eq!(achievement_percentage(dec!(15), dec!(10)), dec!(150));
    }

    #[test]
    fn overall_rate_uses_totals() {
        let schemes = [
            progress(Scheme::Ihhl, dec!(100), dec!(50)),
            progress(Scheme::Csc, dec!(0), dec!(0)),
            progress(Scheme::Rrc, dec!(100), dec!(100)),
        ];
        assert_eq!(overall_achievement_rate(&schemes), dec!(75));
        assert_eq!(overall_achievement_rate(&[]), Decimal::ZERO);
    }

    #[test]
    fn breakdown_merges_duplicate_schemes() {
        let schemes = [
            progress(Scheme::SoakPit, dec!(3), dec!(1)),
            progress(Scheme::SoakPit, dec!(0), dec!(1)),
            progress(Scheme::Wsp, dec!(0), dec!(4)),
        ];
        let breakdown = scheme_breakdown(&schemes);
        assert_eq!(breakdown[&Scheme::SoakPit], dec!(66.67));
        assert_eq!(breakdown[&Scheme::Wsp], Decimal::ZERO);
        assert!(!breakdown.contains_key(&Scheme::Ihhl));
    }
}
