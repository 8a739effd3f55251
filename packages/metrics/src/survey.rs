//! Survey achievement provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sanitation_formula::survey::overall_achievement_rate;
use sanitation_geography_models::{DateRange, NodeId};
use sanitation_metrics_models::{LeafMetric, SurveyRecord};

use crate::{MetricProvider, ProviderError, SurveySource, absent_for, mean};

/// A village is present when it has a survey in range. Each survey scores
/// its overall SBMG achievement rate; the village scores the mean of those.
pub struct SurveyProvider<S> {
    source: Arc<S>,
}

impl<S: SurveySource> SurveyProvider<S> {
    /// Creates a provider reading from `source`.
    #[must_use]
    pub const fn new(source: Arc<S>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: SurveySource> MetricProvider for SurveyProvider<S> {
    fn name(&self) -> &'static str {
        "survey"
    }

    async fn fetch(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<BTreeMap<NodeId, LeafMetric>, ProviderError> {
        let records = self.source.surveys(leaf_ids, range).await?;
        log::debug!(
            "fetch: {} surveys for {} villages",
            records.len(),
            leaf_ids.len()
        );

        let mut metrics = absent_for(leaf_ids);

        let mut by_leaf: BTreeMap<NodeId, Vec<&SurveyRecord>> = BTreeMap::new();
        for record in &records {
            if metrics.contains_key(&record.leaf_id) && range.contains(record.surveyed_on) {
                by_leaf.entry(record.leaf_id).or_default().push(record);
            }
        }

        for (leaf_id, mut surveys) in by_leaf {
            surveys.sort_by_key(|r| (r.surveyed_on, r.id));

            let rates: Vec<Decimal> = surveys
                .iter()
                .map(|r| overall_achievement_rate(&r.schemes))
                .collect();

            if let Some(score) = mean(&rates) {
                metrics.insert(
                    leaf_id,
                    LeafMetric {
                        present: true,
                        score,
                        latest_score: rates.last().copied(),
                        record_count: rates.len() as u64,
                    },
                );
            }
        }

        Ok(metrics)
    }
}
