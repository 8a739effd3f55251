//! Inspection checklist answers.
//!
//! Every yes/no question is tri-state: `None` means the inspector left it
//! unanswered. Sections are optional because older inspections may lack
//! a section entirely.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How often a service is performed in the village.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    /// Every day
    Daily,
    /// Every three days
    OnceInThreeDays,
    /// Every week
    Weekly,
    /// Every two weeks
    Fortnightly,
    /// Every month
    Monthly,
    /// Anything else, including "never"
    #[serde(other)]
    Other,
}

impl Frequency {
    /// Parses a stored frequency, mapping unknown values to [`Frequency::Other`].
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.trim().to_uppercase().parse().unwrap_or(Self::Other)
    }
}

/// Household waste collection and disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdWasteItems {
    /// How often waste is collected.
    pub waste_collection_frequency: Option<Frequency>,
    /// Separate dry/wet compartments in the vehicle.
    pub dry_wet_vehicle_segregation: Option<bool>,
    /// Waste is covered during collection.
    pub covered_collection_in_vehicles: Option<bool>,
    /// Waste ends up at the resource recovery centre.
    pub waste_disposed_at_rrc: Option<bool>,
    /// The collection vehicle works.
    pub waste_collection_vehicle_functional: Option<bool>,
}

/// Road cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadCleaningItems {
    /// How often roads are swept.
    pub road_cleaning_frequency: Option<Frequency>,
}

/// Drain cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrainCleaningItems {
    /// How often drains are cleaned.
    pub drain_cleaning_frequency: Option<Frequency>,
    /// Sludge removed from drains is disposed of.
    pub disposal_of_sludge_from_drains: Option<bool>,
    /// Drain waste was found dumped on the roadside. Scored inverted.
    pub drain_waste_collected_on_roadside: Option<bool>,
}

/// Community sanitary complex upkeep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunitySanitationItems {
    /// How often the complex is cleaned.
    pub csc_cleaning_frequency: Option<Frequency>,
    /// Electricity and water are available.
    pub electricity_and_water: Option<bool>,
    /// The community actually uses the complex.
    pub csc_used_by_community: Option<bool>,
    /// Pink (women's) toilets are cleaned.
    pub pink_toilets_cleaning: Option<bool>,
}

/// Contract and general cleanliness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherItems {
    /// The firm is paid on schedule.
    pub firm_paid_regularly: Option<bool>,
    /// Cleaning staff are paid on schedule.
    pub cleaning_staff_paid_regularly: Option<bool>,
    /// The firm provided safety equipment.
    pub firm_provided_safety_equipment: Option<bool>,
    /// The village is visibly clean.
    pub village_visibly_clean: Option<bool>,
    /// The rate chart is displayed.
    pub rate_chart_displayed: Option<bool>,
}

/// All checklist sections of one inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionChecklist {
    /// Household waste section.
    #[serde(default)]
    pub household_waste: Option<HouseholdWasteItems>,
    /// Road cleaning section.
    #[serde(default)]
    pub road_cleaning: Option<RoadCleaningItems>,
    /// Drain cleaning section.
    #[serde(default)]
    pub drain_cleaning: Option<DrainCleaningItems>,
    /// Community sanitation section.
    #[serde(default)]
    pub community_sanitation: Option<CommunitySanitationItems>,
    /// Other checks.
    #[serde(default)]
    pub other: Option<OtherItems>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_frequency_is_other() {
        assert_eq!(Frequency::parse_lenient("daily"), Frequency::Daily);
        assert_eq!(
            Frequency::parse_lenient(" once_in_three_days "),
            Frequency::OnceInThreeDays
        );
        assert_eq!(Frequency::parse_lenient("TWICE_A_YEAR"), Frequency::Other);

        let parsed: Frequency = serde_json::from_str("\"QUARTERLY\"").unwrap();
        assert_eq!(parsed, Frequency::Other);
    }

    #[test]
    fn missing_sections_deserialize_as_none() {
        let checklist: InspectionChecklist =
            serde_json::from_str(r#"{ "roadCleaning": { "roadCleaningFrequency": "WEEKLY" } }"#)
                .unwrap();
        assert!(checklist.household_waste.is_none());
        assert_eq!(
            checklist.road_cleaning.unwrap().road_cleaning_frequency,
            Some(Frequency::Weekly)
        );
    }
}
