//! Complaint resolution performance.
//!
//! The score has two halves: how fast complaints are resolved relative to
//! the SLA, and what share of them gets resolved at all.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ScoringRubric, round2};

/// Complaint counts for one geography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintStats {
    /// Complaints filed.
    pub total: u64,
    /// Complaints resolved.
    pub resolved: u64,
    /// Sum of resolution times of resolved complaints.
    pub total_resolution_seconds: u64,
}

impl ComplaintStats {
    /// Accumulates `(created_at, resolved_at)` pairs. A resolution stamped
    /// before creation counts as instant.
    #[must_use]
    pub fn from_timestamps(
        complaints: impl IntoIterator<Item = (DateTime<Utc>, Option<DateTime<Utc>>)>,
    ) -> Self {
        let mut stats = Self::default();
        for (created_at, resolved_at) in complaints {
            stats.total += 1;
            if let Some(resolved_at) = resolved_at {
                stats.resolved += 1;
                let seconds = (resolved_at - created_at).num_seconds().max(0);
                stats.total_resolution_seconds += seconds.unsigned_abs();
            }
        }
        stats
    }

    /// Mean resolution time over resolved complaints. With nothing resolved
    /// this is the SLA itself, which earns no time points.
    #[must_use]
    pub fn average_resolution_seconds(&self, rubric: &ScoringRubric) -> Decimal {
        if self.resolved == 0 {
            return Decimal::from(rubric.complaint.sla_seconds);
        }
        Decimal::from(self.total_resolution_seconds) / Decimal::from(self.resolved)
    }

    /// Scores these counts.
    #[must_use]
    pub fn score(&self, rubric: &ScoringRubric) -> ComplaintScore {
        ComplaintScore::compute(
            self.total,
            self.resolved,
            self.average_resolution_seconds(rubric),
            rubric,
        )
    }
}

/// Complaint performance score, each part rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintScore {
    /// Points for resolution speed.
    pub resolution_time_score: Decimal,
    /// Points for resolution rate.
    pub resolution_rate_score: Decimal,
    /// Sum of both parts.
    pub total: Decimal,
}

impl ComplaintScore {
    /// `Score1 = max(0, (sla - avg) / sla) * w1` and
    /// `Score2 = max(0, resolved / total) * w2`, with `total = 0` scoring
    /// zero on the rate half. Negative averages are treated as zero.
    #[must_use]
    pub fn compute(
        total_count: u64,
        resolved_count: u64,
        avg_resolution_seconds: Decimal,
        rubric: &ScoringRubric,
    ) -> Self {
        let sla = Decimal::from(rubric.complaint.sla_seconds);
        let avg = avg_resolution_seconds.max(Decimal::ZERO);

        let time_fraction = if sla > Decimal::ZERO {
            ((sla - avg) / sla).max(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };
        let time_score = time_fraction * Decimal::from(rubric.complaint.resolution_time_weight);

        let rate_score = if total_count == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(resolved_count) / Decimal::from(total_count)).max(Decimal::ZERO)
                * Decimal::from(rubric.complaint.resolution_rate_weight)
        };

        Self {
            resolution_time_score: round2(time_score),
            resolution_rate_score: round2(rate_score),
            total: round2(time_score + rate_score),
        }
    }
}

/// One entry of a performance ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPerformance<K> {
    /// 1-based position.
    pub rank: usize,
    /// What was ranked, typically a geography id.
    pub key: K,
    /// Its score.
    pub score: Decimal,
}

/// Orders entries by score, best first, ties by key ascending, and keeps
/// the top `n`.
#[must_use]
pub fn rank_by_performance<K: Ord>(
    entries: impl IntoIterator<Item = (K, Decimal)>,
    n: usize,
) -> Vec<RankedPerformance<K>> {
    let mut entries: Vec<(K, Decimal)> = entries.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    entries
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (key, score))| RankedPerformance {
            rank: i + 1,
            key,
            score,
        })
        .collect()
}
