//! The single fold used at every tree level.
//!
//! Intermediate values keep full precision. Rounding happens only in
//! [`Rollup::finish`].

use rust_decimal::Decimal;
use sanitation_aggregation_models::CoverageResult;
use sanitation_formula::{percentage, round2};
use sanitation_geography_models::{Level, NodeId};
use sanitation_metrics_models::LeafMetric;

/// Unrounded aggregate of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rollup {
    /// Villages under the node.
    pub total: u64,
    /// Covered villages under the node.
    pub covered: u64,
    /// Mean of covered children's averages, or the village's own score.
    pub average: Decimal,
    /// Sum of every covered village's score under the node.
    pub score_sum: Decimal,
    /// Immediate children.
    pub child_nodes: u64,
    /// Immediate children that are covered.
    pub covered_child_nodes: u64,
    /// Surviving leaf records.
    pub record_count: u64,
    /// Latest record score, only meaningful for a village.
    pub latest: Option<Decimal>,
}

impl Rollup {
    /// A village: it counts itself, and covers itself when present.
    #[must_use]
    pub fn leaf(metric: &LeafMetric) -> Self {
        if !metric.present {
            return Self {
                total: 1,
                record_count: metric.record_count,
                ..Self::default()
            };
        }
        Self {
            total: 1,
            covered: 1,
            average: metric.score,
            score_sum: metric.score,
            child_nodes: 0,
            covered_child_nodes: 0,
            record_count: metric.record_count,
            latest: metric.latest_score,
        }
    }

    /// Whether anything under the node is covered.
    #[must_use]
    pub const fn is_covered(&self) -> bool {
        self.covered > 0
    }

    /// Rounds into the public result.
    #[must_use]
    pub fn finish(self, node_id: NodeId, level: Level) -> CoverageResult {
        CoverageResult {
            node_id,
            level,
            total_children: self.total,
            covered_children: self.covered,
            average_score: round2(self.average),
            total_score: round2(self.score_sum),
            coverage_percentage: round2(percentage(
                Decimal::from(self.covered),
                Decimal::from(self.total),
            )),
            child_nodes: self.child_nodes,
            covered_child_nodes: self.covered_child_nodes,
            record_count: self.record_count,
            latest_score: if level.is_leaf() {
                self.latest.map(round2)
            } else {
                None
            },
        }
    }
}

/// Accumulates immediate children into their parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParentFold {
    total: u64,
    covered: u64,
    average_sum: Decimal,
    score_sum: Decimal,
    child_nodes: u64,
    covered_child_nodes: u64,
    record_count: u64,
}

impl ParentFold {
    /// Adds one immediate child. Uncovered children add to the totals but
    /// never to the average.
    pub fn push(&mut self, child: &Rollup) {
        self.total += child.total;
        self.covered += child.covered;
        self.child_nodes += 1;
        self.record_count += child.record_count;
        self.score_sum += child.score_sum;
        if child.is_covered() {
            self.covered_child_nodes += 1;
            self.average_sum += child.average;
        }
    }

    /// Closes the fold. The average is the unweighted mean over covered
    /// children, 0 when none are covered.
    #[must_use]
    pub fn finish(self) -> Rollup {
        let average = if self.covered_child_nodes == 0 {
            Decimal::ZERO
        } else {
            self.average_sum / Decimal::from(self.covered_child_nodes)
        };
        Rollup {
            total: self.total,
            covered: self.covered,
            average,
            score_sum: self.score_sum,
            child_nodes: self.child_nodes,
            covered_child_nodes: self.covered_child_nodes,
            record_count: self.record_count,
            latest: None,
        }
    }
}
