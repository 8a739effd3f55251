//! Contractor presence provider.
//!
//! Coverage-only in practice: the score is a contract amount sum in the
//! base currency unit, not a percentage.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use sanitation_geography_models::{DateRange, NodeId};
use sanitation_metrics_models::LeafMetric;

use crate::{ContractorSource, MetricProvider, ProviderError, absent_for};

/// A village is present when any contract term overlaps the range.
pub struct ContractorProvider<S> {
    source: Arc<S>,
}

impl<S: ContractorSource> ContractorProvider<S> {
    /// Creates a provider reading from `source`.
    #[must_use]
    pub const fn new(source: Arc<S>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: ContractorSource> MetricProvider for ContractorProvider<S> {
    fn name(&self) -> &'static str {
        "contractor"
    }

    async fn fetch(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<BTreeMap<NodeId, LeafMetric>, ProviderError> {
        let records = self.source.contractors(leaf_ids, range).await?;
        log::debug!(
            "fetch: {} contractors for {} villages",
            records.len(),
            leaf_ids.len()
        );

        let mut metrics = absent_for(leaf_ids);

        for record in &records {
            if !range.overlaps(record.contract_start, record.contract_end) {
                continue;
            }
            if let (Some(start), Some(end)) = (record.contract_start, record.contract_end)
                && start > end
            {
                log::warn!(
                    "Skipping contractor {}: contract ends {end} before it starts {start}",
                    record.id
                );
                continue;
            }
            let Some(metric) = metrics.get_mut(&record.leaf_id) else {
                continue;
            };
            metric.present = true;
            metric.score += record.contract_amount;
            metric.record_count += 1;
        }

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sanitation_metrics_models::ContractorRecord;

    use crate::MemoryRecords;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract(
        id: i64,
        leaf: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        amount: Decimal,
    ) -> ContractorRecord {
        ContractorRecord {
            id,
            leaf_id: NodeId(leaf),
            agency_name: Some(format!("Agency {id}")),
            contract_start: start,
            contract_end: end,
            contract_amount: amount,
        }
    }

    #[tokio::test]
    async fn sums_active_contract_amounts() {
        let records = MemoryRecords {
            contractors: vec![
                contract(1, 3000, Some(ymd(2024, 1, 1)), Some(ymd(2024, 12, 31)), dec!(1500000)),
                contract(2, 3000, None, None, dec!(500000)),
                contract(3, 3000, Some(ymd(2022, 1, 1)), Some(ymd(2022, 12, 31)), dec!(999)),
                contract(4, 3001, Some(ymd(2025, 6, 1)), None, dec!(10)),
            ],
            ..MemoryRecords::default()
        };
        let provider = ContractorProvider::new(Arc::new(records));

        let range = DateRange::new(Some(ymd(2024, 3, 1)), Some(ymd(2024, 3, 31))).unwrap();
        let metrics = provider
            .fetch(&[NodeId(3000), NodeId(3001)], &range)
            .await
            .unwrap();

        let active = &metrics[&NodeId(3000)];
        assert!(active.present);
        assert_eq!(active.record_count, 2);
        assert_eq!(active.score, dec!(2000000));
        assert_eq!(active.latest_score, None);

        assert!(!metrics[&NodeId(3001)].present);
    }

    #[tokio::test]
    async fn unbounded_range_activates_every_contract() {
        let records = MemoryRecords {
            contractors: vec![contract(
                1,
                3000,
                Some(ymd(2010, 1, 1)),
                Some(ymd(2011, 1, 1)),
                dec!(5),
            )],
            ..MemoryRecords::default()
        };
        let provider = ContractorProvider::new(Arc::new(records));
        let metrics = provider
            .fetch(&[NodeId(3000)], &DateRange::unbounded())
            .await
            .unwrap();
        assert!(metrics[&NodeId(3000)].present);
    }
}
