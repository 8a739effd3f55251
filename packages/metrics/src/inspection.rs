//! Inspection score provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sanitation_formula::{ScoringRubric, inspection::overall_score_unrounded};
use sanitation_geography_models::{DateRange, NodeId};
use sanitation_metrics_models::{InspectionRecord, LeafMetric};

use crate::{InspectionSource, MetricProvider, ProviderError, absent_for, mean};

/// A village is present when it has at least one inspection in range. Its
/// score is the mean overall inspection score, and the latest inspection
/// (by date, then start time) is reported separately.
pub struct InspectionProvider<S> {
    source: Arc<S>,
    rubric: ScoringRubric,
}

impl<S: InspectionSource> InspectionProvider<S> {
    /// Creates a provider scoring with the standard rubric.
    #[must_use]
    pub fn new(source: Arc<S>) -> Self {
        Self::with_rubric(source, ScoringRubric::standard().clone())
    }

    /// Creates a provider scoring with `rubric`.
    #[must_use]
    pub const fn with_rubric(source: Arc<S>, rubric: ScoringRubric) -> Self {
        Self { source, rubric }
    }
}

/// Sort key placing the most recent inspection last.
fn recency(record: &InspectionRecord) -> (NaiveDate, Option<NaiveTime>, i64) {
    (record.date, record.start_time, record.id)
}

#[async_trait]
impl<S: InspectionSource> MetricProvider for InspectionProvider<S> {
    fn name(&self) -> &'static str {
        "inspection"
    }

    async fn fetch(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<BTreeMap<NodeId, LeafMetric>, ProviderError> {
        let records = self.source.inspections(leaf_ids, range).await?;
        log::debug!(
            "fetch: {} inspections for {} villages",
            records.len(),
            leaf_ids.len()
        );

        let mut metrics = absent_for(leaf_ids);

        let mut by_leaf: BTreeMap<NodeId, Vec<&InspectionRecord>> = BTreeMap::new();
        for record in &records {
            if metrics.contains_key(&record.leaf_id) && range.contains(record.date) {
                by_leaf.entry(record.leaf_id).or_default().push(record);
            }
        }

        for (leaf_id, mut inspections) in by_leaf {
            inspections.sort_by_key(|r| recency(r));

            let scores: Vec<Decimal> = inspections
                .iter()
                .map(|r| overall_score_unrounded(&r.checklist, &self.rubric))
                .collect();

            let Some(score) = mean(&scores) else {
                continue;
            };

            metrics.insert(
                leaf_id,
                LeafMetric {
                    present: true,
                    score,
                    latest_score: scores.last().copied(),
                    record_count: scores.len() as u64,
                },
            );
        }

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sanitation_metrics_models::{Frequency, InspectionChecklist, OtherItems, RoadCleaningItems};

    use crate::MemoryRecords;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    /// A checklist earning `flags * 10` points in the "other" section, plus
    /// 10 road cleaning points when `road` is set.
    fn checklist(flags: usize, road: bool) -> InspectionChecklist {
        let answer = |i: usize| Some(i < flags);
        InspectionChecklist {
            other: Some(OtherItems {
                firm_paid_regularly: answer(0),
                cleaning_staff_paid_regularly: answer(1),
                firm_provided_safety_equipment: answer(2),
                village_visibly_clean: answer(3),
                rate_chart_displayed: answer(4),
            }),
            road_cleaning: road.then_some(RoadCleaningItems {
                road_cleaning_frequency: Some(Frequency::Weekly),
            }),
            ..InspectionChecklist::default()
        }
    }

    fn inspection(
        id: i64,
        leaf: i64,
        day: u32,
        start: Option<(u32, u32)>,
        checklist: InspectionChecklist,
    ) -> InspectionRecord {
        InspectionRecord {
            id,
            leaf_id: NodeId(leaf),
            date: date(day),
            start_time: start.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            checklist,
        }
    }

    #[tokio::test]
    async fn mean_and_latest_are_reported_separately() {
        // 20, 30 and 50 of 180 points.
        let records = MemoryRecords {
            inspections: vec![
                inspection(1, 1000, 1, None, checklist(1, true)),
                inspection(2, 1000, 5, Some((9, 0)), checklist(3, false)),
                inspection(3, 1000, 5, Some((14, 30)), checklist(4, true)),
            ],
            ..MemoryRecords::default()
        };
        let provider = InspectionProvider::new(Arc::new(records));

        let metrics = provider
            .fetch(&[NodeId(1000), NodeId(1001)], &DateRange::unbounded())
            .await
            .unwrap();

        let inspected = &metrics[&NodeId(1000)];
        assert!(inspected.present);
        assert_eq!(inspected.record_count, 3);
        assert_eq!(inspected.latest_score.unwrap().round_dp(2), dec!(27.78));
        assert_eq!(inspected.score.round_dp(2), dec!(18.52));

        assert_eq!(metrics[&NodeId(1001)], LeafMetric::absent());
    }

    #[tokio::test]
    async fn date_range_drops_records_outside() {
        let records = MemoryRecords {
            inspections: vec![
                inspection(1, 1000, 1, None, checklist(5, true)),
                inspection(2, 1000, 20, None, checklist(0, false)),
            ],
            ..MemoryRecords::default()
        };
        let provider = InspectionProvider::new(Arc::new(records));

        let range = DateRange::new(Some(date(10)), None).unwrap();
        let metrics = provider.fetch(&[NodeId(1000)], &range).await.unwrap();
        let metric = &metrics[&NodeId(1000)];
        assert!(metric.present);
        assert_eq!(metric.record_count, 1);
        assert_eq!(metric.score, Decimal::ZERO);

        let range = DateRange::new(Some(date(21)), Some(date(25))).unwrap();
        let metrics = provider.fetch(&[NodeId(1000)], &range).await.unwrap();
        assert!(!metrics[&NodeId(1000)].present);
    }
}
