//! The immutable scoring configuration.
//!
//! The standard rubric is embedded at compile time from `rubric.toml` and
//! parsed once. Deployments that need a different rubric load their own with
//! [`ScoringRubric::from_toml_str`]; both paths go through the same
//! consistency checks.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use sanitation_metrics_models::Frequency;
use serde::{Deserialize, Serialize};

use crate::FormulaError;

/// Embedded standard rubric.
const STANDARD_RUBRIC_TOML: &str = include_str!("rubric.toml");

static STANDARD_RUBRIC: LazyLock<ScoringRubric> = LazyLock::new(|| {
    ScoringRubric::from_toml_str(STANDARD_RUBRIC_TOML)
        .unwrap_or_else(|e| panic!("Failed to load embedded scoring rubric: {e}"))
});

/// Maximum points per inspection category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryMaxPoints {
    /// Household waste collection and disposal.
    pub household_waste: u32,
    /// Road cleaning.
    pub road_cleaning: u32,
    /// Drain cleaning.
    pub drain_cleaning: u32,
    /// Community sanitation.
    pub community_sanitation: u32,
    /// Other checks.
    pub other: u32,
}

impl CategoryMaxPoints {
    /// Sum over all categories.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.household_waste
            + self.road_cleaning
            + self.drain_cleaning
            + self.community_sanitation
            + self.other
    }
}

/// Complaint performance score parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComplaintRubric {
    /// Resolution SLA in seconds (7 days).
    pub sla_seconds: u64,
    /// Points awarded for resolving instantly.
    pub resolution_time_weight: u32,
    /// Points awarded for resolving every complaint.
    pub resolution_rate_weight: u32,
}

/// Display-only conversions applied after aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresentationRubric {
    /// Base currency units per Crore.
    pub crore_divisor: u64,
}

/// Point tables and constants for every formula in this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringRubric {
    /// Points for each "yes" answer.
    pub flag_points: u32,
    /// Points an inspection can earn in total.
    pub overall_max_points: u32,
    /// Frequency table for waste collection and CSC cleaning. Frequencies
    /// not listed earn nothing.
    pub frequent_service_points: BTreeMap<Frequency, u32>,
    /// Frequency table for road and drain cleaning. Frequencies not listed
    /// earn nothing.
    pub periodic_service_points: BTreeMap<Frequency, u32>,
    /// Per-category maxima.
    pub category_max_points: CategoryMaxPoints,
    /// Complaint score parameters.
    pub complaint: ComplaintRubric,
    /// Presentation constants.
    pub presentation: PresentationRubric,
}

impl ScoringRubric {
    /// The standard rubric embedded in this crate.
    ///
    /// # Panics
    ///
    /// Panics if the embedded `rubric.toml` fails to parse or validate.
    /// Since it is a compile-time constant, a failure is a development error
    /// and is caught by this crate's tests.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD_RUBRIC
    }

    /// Parses and validates a rubric.
    ///
    /// # Errors
    ///
    /// Returns [`FormulaError::Parse`] for malformed TOML and
    /// [`FormulaError::InvalidRubric`] for inconsistent point tables.
    pub fn from_toml_str(s: &str) -> Result<Self, FormulaError> {
        let rubric: Self = toml::de::from_str(s)?;
        rubric.validate()?;
        Ok(rubric)
    }

    /// Points for a waste-collection style frequency.
    #[must_use]
    pub fn frequent_points(&self, frequency: Option<Frequency>) -> u32 {
        frequency
            .and_then(|f| self.frequent_service_points.get(&f).copied())
            .unwrap_or(0)
    }

    /// Points for a road/drain-cleaning style frequency.
    #[must_use]
    pub fn periodic_points(&self, frequency: Option<Frequency>) -> u32 {
        frequency
            .and_then(|f| self.periodic_service_points.get(&f).copied())
            .unwrap_or(0)
    }

    /// Points for a yes/no answer. Only an explicit "yes" earns points.
    #[must_use]
    pub fn flag(&self, answer: Option<bool>) -> u32 {
        if answer == Some(true) {
            self.flag_points
        } else {
            0
        }
    }

    /// Points for an inverted yes/no answer. Only an explicit "no" earns
    /// points; an unanswered question earns nothing.
    #[must_use]
    pub fn inverted_flag(&self, answer: Option<bool>) -> u32 {
        if answer == Some(false) {
            self.flag_points
        } else {
            0
        }
    }

    /// Checks that the declared maxima match what the tables can award.
    ///
    /// # Errors
    ///
    /// Returns [`FormulaError::InvalidRubric`] describing the first
    /// inconsistency.
    pub fn validate(&self) -> Result<(), FormulaError> {
        let best_frequent = self
            .frequent_service_points
            .values()
            .copied()
            .max()
            .unwrap_or(0);
        let best_periodic = self
            .periodic_service_points
            .values()
            .copied()
            .max()
            .unwrap_or(0);
        let flag = self.flag_points;
        let max = &self.category_max_points;

        let expected = [
            ("household_waste", max.household_waste, best_frequent + 4 * flag),
            ("road_cleaning", max.road_cleaning, best_periodic),
            ("drain_cleaning", max.drain_cleaning, best_periodic + 2 * flag),
            (
                "community_sanitation",
                max.community_sanitation,
                best_frequent + 3 * flag,
            ),
            ("other", max.other, 5 * flag),
        ];

        for (name, declared, achievable) in expected {
            if declared == 0 {
                return Err(FormulaError::InvalidRubric {
                    message: format!("category {name} has a zero maximum"),
                });
            }
            if declared != achievable {
                return Err(FormulaError::InvalidRubric {
                    message: format!(
                        "category {name} declares {declared} points but the tables award at most {achievable}"
                    ),
                });
            }
        }

        if max.total() != self.overall_max_points {
            return Err(FormulaError::InvalidRubric {
                message: format!(
                    "category maxima sum to {} but overall_max_points is {}",
                    max.total(),
                    self.overall_max_points
                ),
            });
        }

        if self.complaint.sla_seconds == 0 {
            return Err(FormulaError::InvalidRubric {
                message: "complaint.sla_seconds must be positive".to_string(),
            });
        }

        if self.presentation.crore_divisor == 0 {
            return Err(FormulaError::InvalidRubric {
                message: "presentation.crore_divisor must be positive".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rubric_loads() {
        let rubric = ScoringRubric::standard();
        assert_eq!(rubric.overall_max_points, 180);
        assert_eq!(rubric.category_max_points.total(), 180);
        assert_eq!(rubric.complaint.sla_seconds, 604_800);
        assert_eq!(rubric.presentation.crore_divisor, 10_000_000);
    }

    #[test]
    fn frequency_tables_match_published_points() {
        let rubric = ScoringRubric::standard();
        assert_eq!(rubric.frequent_points(Some(Frequency::Daily)), 10);
        assert_eq!(rubric.frequent_points(Some(Frequency::OnceInThreeDays)), 7);
        assert_eq!(rubric.frequent_points(Some(Frequency::Weekly)), 3);
        assert_eq!(rubric.frequent_points(Some(Frequency::Monthly)), 0);
        assert_eq!(rubric.frequent_points(None), 0);

        assert_eq!(rubric.periodic_points(Some(Frequency::Weekly)), 10);
        assert_eq!(rubric.periodic_points(Some(Frequency::Fortnightly)), 5);
        assert_eq!(rubric.periodic_points(Some(Frequency::Monthly)), 2);
        assert_eq!(rubric.periodic_points(Some(Frequency::Daily)), 0);
        assert_eq!(rubric.periodic_points(Some(Frequency::Other)), 0);
    }

    #[test]
    fn flags_only_reward_explicit_answers() {
        let rubric = ScoringRubric::standard();
        assert_eq!(rubric.flag(Some(true)), 10);
        assert_eq!(rubric.flag(Some(false)), 0);
        assert_eq!(rubric.flag(None), 0);
        assert_eq!(rubric.inverted_flag(Some(false)), 10);
        assert_eq!(rubric.inverted_flag(Some(true)), 0);
        assert_eq!(rubric.inverted_flag(None), 0);
    }

    #[test]
    fn rejects_inconsistent_maxima() {
        let broken = STANDARD_RUBRIC_TOML.replace("road_cleaning = 10", "road_cleaning = 12");
        let err = ScoringRubric::from_toml_str(&broken).unwrap_err();
        assert!(
            matches!(err, FormulaError::InvalidRubric { ref message } if message.contains("road_cleaning")),
            "{err}"
        );
    }

    #[test]
    fn rejects_overall_mismatch_and_zero_sla() {
        let broken = STANDARD_RUBRIC_TOML.replace("overall_max_points = 180", "overall_max_points = 200");
        assert!(ScoringRubric::from_toml_str(&broken).is_err());

        let broken = STANDARD_RUBRIC_TOML.replace("sla_seconds = 604800", "sla_seconds = 0");
        assert!(ScoringRubric::from_toml_str(&broken).is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        let broken = format!("{STANDARD_RUBRIC_TOML}\nbonus_points = 5\n");
        assert!(matches!(
            ScoringRubric::from_toml_str(&broken),
            Err(FormulaError::Parse(_))
        ));
    }
}
