#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative hierarchy types.
//!
//! The portal organizes everything over a four-level tree (state →
//! district → block → village/GP). These types identify nodes in that tree
//! and the date windows used to filter leaf metrics. They carry no
//! behavior beyond validation; reads live in `sanitation_geography`.

pub mod level;

pub use level::Level;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a node at any level of the hierarchy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl NodeId {
    /// Returns the raw integer id.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A node of the administrative tree as stored by the geography tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographyNode {
    /// Node id, unique across all levels.
    pub id: NodeId,
    /// Level of this node.
    pub level: Level,
    /// Parent node id. `None` only for the state.
    pub parent_id: Option<NodeId>,
    /// Human-readable name (district, block or GP name).
    #[serde(default)]
    pub name: String,
}

/// Inclusive date window used to select leaf records.
///
/// Either end may be open. `DateRange::default()` selects everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First day included, if bounded.
    pub start: Option<NaiveDate>,
    /// Last day included, if bounded.
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a validated range.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDateRangeError`] if both ends are set and `start`
    /// is after `end`.
    pub fn new(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, InvalidDateRangeError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// A range with no bounds.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Checks that `start <= end` when both are set.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDateRangeError`] if the range is inverted.
    pub fn validate(&self) -> Result<(), InvalidDateRangeError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(InvalidDateRangeError { start, end }),
            _ => Ok(()),
        }
    }

    /// Whether `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    /// Whether the interval `[from, to]` (open where `None`) shares at least
    /// one day with this range.
    #[must_use]
    pub fn overlaps(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        let starts_before_end = match (from, self.end) {
            (Some(from), Some(end)) => from <= end,
            _ => true,
        };
        let ends_after_start = match (to, self.start) {
            (Some(to), Some(start)) => to >= start,
            _ => true,
        };
        starts_before_end && ends_after_start
    }
}

/// Error returned when a [`DateRange`] starts after it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDateRangeError {
    /// The requested start.
    pub start: NaiveDate,
    /// The requested end.
    pub end: NaiveDate,
}

impl std::fmt::Display for InvalidDateRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid date range: start {} is after end {}",
            self.start, self.end
        )
    }
}

impl std::error::Error for InvalidDateRangeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = DateRange::new(Some(day(2025, 3, 1)), Some(day(2025, 2, 1))).unwrap_err();
        assert_eq!(err.start, day(2025, 3, 1));
        assert!(DateRange::new(Some(day(2025, 2, 1)), Some(day(2025, 2, 1))).is_ok());
        assert!(DateRange::new(None, Some(day(2025, 2, 1))).is_ok());
    }

    #[test]
    fn contains_is_inclusive() {
        let range = DateRange::new(Some(day(2025, 1, 1)), Some(day(2025, 1, 31))).unwrap();
        assert!(range.contains(day(2025, 1, 1)));
        assert!(range.contains(day(2025, 1, 31)));
        assert!(!range.contains(day(2024, 12, 31)));
        assert!(!range.contains(day(2025, 2, 1)));
        assert!(DateRange::unbounded().contains(day(1990, 6, 15)));
    }

    #[test]
    fn overlaps_handles_open_ends() {
        let range = DateRange::new(Some(day(2025, 1, 1)), Some(day(2025, 1, 31))).unwrap();
        assert!(range.overlaps(None, None));
        assert!(range.overlaps(Some(day(2024, 6, 1)), None));
        assert!(range.overlaps(None, Some(day(2025, 1, 1))));
        assert!(!range.overlaps(None, Some(day(2024, 12, 31))));
        assert!(!range.overlaps(Some(day(2025, 2, 1)), None));
        assert!(range.overlaps(Some(day(2025, 1, 10)), Some(day(2025, 1, 12))));
    }

    #[test]
    fn node_id_is_transparent_in_json() {
        let node = GeographyNode {
            id: NodeId(7),
            level: Level::Block,
            parent_id: Some(NodeId(2)),
            name: "Sanganer".to_string(),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["parentId"], 2);
        assert_eq!(json["level"], "BLOCK");
    }
}
