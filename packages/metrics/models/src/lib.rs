#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Leaf metric and leaf record types.
//!
//! Leaf records are what field staff produce against a village: inspections
//! (a scored checklist), annual surveys (scheme targets vs. achievements) and
//! contractor assignments. Metric providers reduce the records of one leaf to
//! a single [`LeafMetric`], which is all the aggregation engine sees.

pub mod checklist;

pub use checklist::{
    CommunitySanitationItems, DrainCleaningItems, Frequency, HouseholdWasteItems,
    InspectionChecklist, OtherItems, RoadCleaningItems,
};

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sanitation_geography_models::NodeId;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Reduced metric for one leaf after date filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafMetric {
    /// Whether at least one record survived the date filter.
    pub present: bool,
    /// Mean score of the surviving records (contract amount sum for
    /// contractors). Zero when not present.
    pub score: Decimal,
    /// Score of the most recent record, for providers that track recency.
    pub latest_score: Option<Decimal>,
    /// Number of records that survived the date filter.
    pub record_count: u64,
}

impl LeafMetric {
    /// A leaf with no surviving records.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            present: false,
            score: Decimal::ZERO,
            latest_score: None,
            record_count: 0,
        }
    }
}

/// One field inspection of a village.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    /// Inspection id.
    pub id: i64,
    /// Village that was inspected.
    pub leaf_id: NodeId,
    /// Day the inspection took place.
    pub date: NaiveDate,
    /// Time the inspection started, used to order same-day inspections.
    pub start_time: Option<NaiveTime>,
    /// Answers recorded by the inspector.
    #[serde(default)]
    pub checklist: InspectionChecklist,
}

/// Swachh Bharat Mission (Gramin) schemes tracked by the annual survey.
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
pub enum Scheme {
    /// Individual household latrine
    Ihhl,
    /// Community sanitary complex
    Csc,
    /// Resource recovery centre
    Rrc,
    /// Plastic waste management unit
    Pwmu,
    /// Soak pit
    SoakPit,
    /// Magic pit
    MagicPit,
    /// Leach pit
    LeachPit,
    /// Waste stabilization pond
    Wsp,
    /// Decentralized wastewater treatment system
    Dewats,
}

impl Scheme {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Ihhl,
            Self::Csc,
            Self::Rrc,
            Self::Pwmu,
            Self::SoakPit,
            Self::MagicPit,
            Self::LeachPit,
            Self::Wsp,
            Self::Dewats,
        ]
    }
}

/// Target and achievement of one scheme in one survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeProgress {
    /// Which scheme.
    pub scheme: Scheme,
    /// Units targeted for the year.
    pub target: Decimal,
    /// Units achieved.
    pub achievement: Decimal,
}

/// An annual survey of a village.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRecord {
    /// Survey id.
    pub id: i64,
    /// Village the survey covers.
    pub leaf_id: NodeId,
    /// Day the survey was filed.
    pub surveyed_on: NaiveDate,
    /// Per-scheme progress. Schemes without data are omitted.
    #[serde(default)]
    pub schemes: Vec<SchemeProgress>,
}

/// A contractor assignment to a village.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorRecord {
    /// Contractor id.
    pub id: i64,
    /// Village served.
    pub leaf_id: NodeId,
    /// Agency holding the contract.
    #[serde(default)]
    pub agency_name: Option<String>,
    /// First day of the contract, open when unknown.
    pub contract_start: Option<NaiveDate>,
    /// Last day of the contract, open when unknown.
    pub contract_end: Option<NaiveDate>,
    /// Contract value in the base currency unit.
    #[serde(default)]
    pub contract_amount: Decimal,
}
