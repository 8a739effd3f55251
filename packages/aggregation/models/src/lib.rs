#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coverage result types.
//!
//! A [`CoverageResult`] is a value object built once per queried node and
//! never mutated afterwards. Batch calls return an [`AggregateOutcome`]
//! holding the successful results next to the per-id failures.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sanitation_geography_models::{Level, NodeId};
use serde::{Deserialize, Serialize};

/// Rolled-up coverage of one node.
///
/// `total_children` and `covered_children` count descendant villages, not
/// immediate children; immediate children are reported in `child_nodes`
/// and `covered_child_nodes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageResult {
    /// The queried node.
    pub node_id: NodeId,
    /// Level of the queried node.
    pub level: Level,
    /// Villages under the node (1 for a village).
    pub total_children: u64,
    /// Villages under the node with at least one record in range.
    pub covered_children: u64,
    /// Unweighted mean of the covered immediate children's averages, 2 dp.
    pub average_score: Decimal,
    /// Sum of the scores of every covered village under the node, 2 dp.
    /// For contractor amounts this is the total contract value.
    pub total_score: Decimal,
    /// `covered_children / total_children * 100`, 2 dp, 0 when nothing is
    /// under the node.
    pub coverage_percentage: Decimal,
    /// Immediate children (0 for a village).
    pub child_nodes: u64,
    /// Immediate children with any coverage.
    pub covered_child_nodes: u64,
    /// Leaf records that survived the date filter, across all villages.
    pub record_count: u64,
    /// Score of the most recent record. Village results only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_score: Option<Decimal>,
}

impl CoverageResult {
    /// Whether at least one village under the node is covered.
    #[must_use]
    pub const fn is_covered(&self) -> bool {
        self.covered_children > 0
    }
}

/// Why a requested id has no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeError {
    /// No node with this id exists.
    NotFound {
        /// The unknown id.
        id: NodeId,
    },
}

impl std::fmt::Display for NodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "node {id} not found"),
        }
    }
}

impl std::error::Error for NodeError {}

/// Result of a batch aggregation.
///
/// Every distinct requested id appears in exactly one of the two maps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateOutcome {
    /// Results keyed by requested id.
    pub results: BTreeMap<NodeId, CoverageResult>,
    /// Per-id failures that did not abort the batch.
    #[serde(default)]
    pub failures: BTreeMap<NodeId, NodeError>,
}

impl AggregateOutcome {
    /// Result for `id`, if it succeeded.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&CoverageResult> {
        self.results.get(&id)
    }

    /// Whether every requested id produced a result.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether nothing was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.failures.is_empty()
    }
}
