//! Shared test doubles.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sanitation_geography_models::{DateRange, GeographyNode, Level, NodeId};
use sanitation_metrics::{MetricProvider, ProviderError};
use sanitation_metrics_models::LeafMetric;
use tokio_util::sync::CancellationToken;

pub fn node(id: i64, level: Level, parent: Option<i64>) -> GeographyNode {
    GeographyNode {
        id: NodeId(id),
        level,
        parent_id: parent.map(NodeId),
        name: format!("{level} {id}"),
    }
}

/// Villages with a fixed score are present; everything else is absent.
#[derive(Debug, Default, Clone)]
pub struct FixedScores(pub BTreeMap<NodeId, Decimal>);

#[async_trait]
impl MetricProvider for FixedScores {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn fetch(
        &self,
        leaf_ids: &[NodeId],
        _range: &DateRange,
    ) -> Result<BTreeMap<NodeId, LeafMetric>, ProviderError> {
        Ok(leaf_ids
            .iter()
            .map(|id| {
                let metric = self.0.get(id).map_or_else(LeafMetric::absent, |score| LeafMetric {
                    present: true,
                    score: *score,
                    latest_score: Some(*score),
                    record_count: 1,
                });
                (*id, metric)
            })
            .collect())
    }
}

/// Always fails.
pub struct BrokenProvider;

#[async_trait]
impl MetricProvider for BrokenProvider {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn fetch(
        &self,
        _leaf_ids: &[NodeId],
        _range: &DateRange,
    ) -> Result<BTreeMap<NodeId, LeafMetric>, ProviderError> {
        Err(ProviderError::Source {
            message: "connection refused".to_string(),
        })
    }
}

/// Cancels the token on first use and never completes.
pub struct CancellingProvider(pub CancellationToken);

#[async_trait]
impl MetricProvider for CancellingProvider {
    fn name(&self) -> &'static str {
        "cancelling"
    }

    async fn fetch(
        &self,
        _leaf_ids: &[NodeId],
        _range: &DateRange,
    ) -> Result<BTreeMap<NodeId, LeafMetric>, ProviderError> {
        self.0.cancel();
        std::future::pending().await
    }
}
