//! Inspection checklist scoring.

use rust_decimal::Decimal;
use sanitation_metrics_models::{
    CommunitySanitationItems, DrainCleaningItems, HouseholdWasteItems, InspectionChecklist,
    OtherItems, RoadCleaningItems,
};
use serde::{Deserialize, Serialize};

use crate::{ScoringRubric, percentage, round2};

/// Raw points earned per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPoints {
    /// Household waste points.
    pub household_waste: u32,
    /// Road cleaning points.
    pub road_cleaning: u32,
    /// Drain cleaning points.
    pub drain_cleaning: u32,
    /// Community sanitation points.
    pub community_sanitation: u32,
    /// Other points.
    pub other: u32,
}

impl CategoryPoints {
    /// Sum over all categories.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.household_waste
            + self.road_cleaning
            + self.drain_cleaning
            + self.community_sanitation
            + self.other
    }

    /// Tallies a checklist against `rubric`. Missing sections score zero.
    #[must_use]
    pub fn tally(checklist: &InspectionChecklist, rubric: &ScoringRubric) -> Self {
        Self {
            household_waste: checklist
                .household_waste
                .map_or(0, |items| household_waste_points(&items, rubric)),
            road_cleaning: checklist
                .road_cleaning
                .map_or(0, |items| road_cleaning_points(&items, rubric)),
            drain_cleaning: checklist
                .drain_cleaning
                .map_or(0, |items| drain_cleaning_points(&items, rubric)),
            community_sanitation: checklist
                .community_sanitation
                .map_or(0, |items| community_sanitation_points(&items, rubric)),
            other: checklist
                .other
                .map_or(0, |items| other_points(&items, rubric)),
        }
    }
}

/// Percentage scores of one inspection, each rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionScore {
    /// Household waste, out of 100.
    pub household_waste: Decimal,
    /// Road cleaning, out of 100.
    pub road_cleaning: Decimal,
    /// Drain cleaning, out of 100.
    pub drain_cleaning: Decimal,
    /// Community sanitation, out of 100.
    pub community_sanitation: Decimal,
    /// Other checks, out of 100.
    pub other: Decimal,
    /// All categories combined, out of 100.
    pub overall: Decimal,
    /// Raw points earned.
    pub total_points: u32,
    /// Raw points available.
    pub max_points: u32,
}

/// Household waste: collection frequency plus four flags.
#[must_use]
pub fn household_waste_points(items: &HouseholdWasteItems, rubric: &ScoringRubric) -> u32 {
    rubric.frequent_points(items.waste_collection_frequency)
        + rubric.flag(items.dry_wet_vehicle_segregation)
        + rubric.flag(items.covered_collection_in_vehicles)
        + rubric.flag(items.waste_disposed_at_rrc)
        + rubric.flag(items.waste_collection_vehicle_functional)
}

/// Road cleaning: frequency only.
#[must_use]
pub fn road_cleaning_points(items: &RoadCleaningItems, rubric: &ScoringRubric) -> u32 {
    rubric.periodic_points(items.road_cleaning_frequency)
}

/// Drain cleaning: frequency, sludge disposal, and an inverted roadside
/// dumping flag.
#[must_use]
pub fn drain_cleaning_points(items: &DrainCleaningItems, rubric: &ScoringRubric) -> u32 {
    rubric.periodic_points(items.drain_cleaning_frequency)
        + rubric.flag(items.disposal_of_sludge_from_drains)
        + rubric.inverted_flag(items.drain_waste_collected_on_roadside)
}

/// Community sanitary complex: cleaning frequency plus three flags.
#[must_use]
pub fn community_sanitation_points(
    items: &CommunitySanitationItems,
    rubric: &ScoringRubric,
) -> u32 {
    rubric.frequent_points(items.csc_cleaning_frequency)
        + rubric.flag(items.electricity_and_water)
        + rubric.flag(items.csc_used_by_community)
        + rubric.flag(items.pink_toilets_cleaning)
}

/// Other checks: five flags.
#[must_use]
pub fn other_points(items: &OtherItems, rubric: &ScoringRubric) -> u32 {
    rubric.flag(items.firm_paid_regularly)
        + rubric.flag(items.cleaning_staff_paid_regularly)
        + rubric.flag(items.firm_provided_safety_equipment)
        + rubric.flag(items.village_visibly_clean)
        + rubric.flag(items.rate_chart_displayed)
}

/// Scores a checklist. Each category is its share of the category maximum,
/// and the overall score is the share of the rubric's overall maximum.
#[must_use]
pub fn score_inspection(checklist: &InspectionChecklist, rubric: &ScoringRubric) -> InspectionScore {
    let points = CategoryPoints::tally(checklist, rubric);
    let max = &rubric.category_max_points;

    let pct = |earned: u32, available: u32| {
        round2(percentage(Decimal::from(earned), Decimal::from(available)))
    };

    let total_points = points.total();

    InspectionScore {
        household_waste: pct(points.household_waste, max.household_waste),
        road_cleaning: pct(points.road_cleaning, max.road_cleaning),
        drain_cleaning: pct(points.drain_cleaning, max.drain_cleaning),
        community_sanitation: pct(points.community_sanitation, max.community_sanitation),
        other: pct(points.other, max.other),
        overall: pct(total_points, rubric.overall_max_points),
        total_points,
        max_points: rubric.overall_max_points,
    }
}

/// Overall score of a checklist at full precision, used when several
/// inspections are averaged before the final rounding.
#[must_use]
pub fn overall_score_unrounded(checklist: &InspectionChecklist, rubric: &ScoringRubric) -> Decimal {
    let points = CategoryPoints::tally(checklist, rubric);
    percentage(
        Decimal::from(points.total()),
        Decimal::from(rubric.overall_max_points),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sanitation_metrics_models::Frequency;

    fn perfect() -> InspectionChecklist {
        InspectionChecklist {
            household_waste: Some(HouseholdWasteItems {
                waste_collection_frequency: Some(Frequency::Daily),
                dry_wet_vehicle_segregation: Some(true),
                covered_collection_in_vehicles: Some(true),
                waste_disposed_at_rrc: Some(true),
                waste_collection_vehicle_functional: Some(true),
            }),
            road_cleaning: Some(RoadCleaningItems {
                road_cleaning_frequency: Some(Frequency::Weekly),
            }),
            drain_cleaning: Some(DrainCleaningItems {
                drain_cleaning_frequency: Some(Frequency::Weekly),
                disposal_of_sludge_from_drains: Some(true),
                drain_waste_collected_on_roadside: Some(false),
            }),
            community_sanitation: Some(CommunitySanitationItems {
                csc_cleaning_frequency: Some(Frequency::Daily),
                electricity_and_water: Some(true),
                csc_used_by_community: Some(true),
                pink_toilets_cleaning: Some(true),
            }),
            other: Some(OtherItems {
                firm_paid_regularly: Some(true),
                cleaning_staff_paid_regularly: Some(true),
                firm_provided_safety_equipment: Some(true),
                village_visibly_clean: Some(true),
                rate_chart_displayed: Some(true),
            }),
        }
    }

    #[test]
    fn household_waste_forty_of_fifty_is_eighty_percent() {
        let checklist = InspectionChecklist {
            household_waste: Some(HouseholdWasteItems {
                waste_collection_frequency: Some(Frequency::Daily),
                dry_wet_vehicle_segregation: Some(true),
                covered_collection_in_vehicles: Some(true),
                waste_disposed_at_rrc: Some(true),
                waste_collection_vehicle_functional: Some(false),
            }),
            ..InspectionChecklist::default()
        };

        let score = score_inspection(&checklist, ScoringRubric::standard());
        assert_eq!(score.household_waste, dec!(80.00));
        assert_eq!(score.total_points, 40);
        assert_eq!(score.max_points, 180);
        assert_eq!(score.overall, dec!(22.22));
    }

    #[test]
    fn perfect_checklist_scores_one_hundred() {
        let score = score_inspection(&perfect(), ScoringRubric::standard());
        assert_eq!(score.overall, dec!(100));
        assert_eq!(score.household_waste, dec!(100));
        assert_eq!(score.road_cleaning, dec!(100));
        assert_eq!(score.drain_cleaning, dec!(100));
        assert_eq!(score.community_sanitation, dec!(100));
        assert_eq!(score.other, dec!(100));
        assert_eq!(score.total_points, 180);
    }

    #[test]
    fn empty_checklist_scores_zero() {
        let score = score_inspection(&InspectionChecklist::default(), ScoringRubric::standard());
        assert_eq!(score.overall, Decimal::ZERO);
        assert_eq!(score.total_points, 0);
    }

    #[test]
    fn roadside_dumping_is_inverted_and_unanswered_earns_nothing() {
        let rubric = ScoringRubric::standard();
        let mut items = DrainCleaningItems {
            drain_cleaning_frequency: Some(Frequency::Fortnightly),
            disposal_of_sludge_from_drains: None,
            drain_waste_collected_on_roadside: Some(true),
        };
        assert_eq!(drain_cleaning_points(&items, rubric), 5);

        items.drain_waste_collected_on_roadside = None;
        assert_eq!(drain_cleaning_points(&items, rubric), 5);

        items.drain_waste_collected_on_roadside = Some(false);
        assert_eq!(drain_cleaning_points(&items, rubric), 15);
    }

    #[test]
    fn unrounded_overall_keeps_precision() {
        let checklist = InspectionChecklist {
            road_cleaning: Some(RoadCleaningItems {
                road_cleaning_frequency: Some(Frequency::Monthly),
            }),
            ..InspectionChecklist::default()
        };
        let rubric = ScoringRubric::standard();
        let unrounded = overall_score_unrounded(&checklist, rubric);
        assert!(unrounded > dec!(1.11) && unrounded < dec!(1.112));
        assert_eq!(score_inspection(&checklist, rubric).overall, dec!(1.11));
    }
}
