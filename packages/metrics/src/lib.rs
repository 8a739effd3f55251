#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Leaf metric providers.
//!
//! A provider turns the raw records of a set of villages into one
//! [`LeafMetric`] per village for a date range. The aggregation engine is
//! generic over [`MetricProvider`], so inspections, surveys and contractor
//! assignments all roll up through the same code path.
//!
//! Providers read records through the source traits in [`source`]; the
//! database adapter and [`MemoryRecords`] implement them.

pub mod contractor;
pub mod inspection;
pub mod memory;
pub mod source;
pub mod survey;

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sanitation_geography_models::{DateRange, NodeId};
use sanitation_metrics_models::LeafMetric;
use thiserror::Error;

pub use contractor::ContractorProvider;
pub use inspection::InspectionProvider;
pub use memory::MemoryRecords;
pub use source::{ContractorSource, InspectionSource, SurveySource};
pub use survey::SurveyProvider;

/// Errors that can occur while reading leaf records.
///
/// Any provider error is fatal to the aggregation that triggered it.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The record source is unavailable or failed.
    #[error("Metric source error: {message}")]
    Source {
        /// Description of what went wrong.
        message: String,
    },

    /// A stored record could not be interpreted.
    #[error("Invalid record {record_id}: {message}")]
    InvalidRecord {
        /// Id of the offending record.
        record_id: i64,
        /// What is wrong with it.
        message: String,
    },
}

/// Reduces the records of leaves to one [`LeafMetric`] each.
#[async_trait]
pub trait MetricProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetches metrics for `leaf_ids` restricted to `range`.
    ///
    /// The result has an entry for every requested leaf; leaves without
    /// surviving records map to [`LeafMetric::absent`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the underlying records cannot be read.
    async fn fetch(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<BTreeMap<NodeId, LeafMetric>, ProviderError>;
}

/// Arithmetic mean at full precision, `None` for an empty input.
fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().copied().sum();
    Some(sum / Decimal::from(values.len()))
}

/// Starts a result map with every requested leaf marked absent.
fn absent_for(leaf_ids: &[NodeId]) -> BTreeMap<NodeId, LeafMetric> {
    leaf_ids
        .iter()
        .map(|id| (*id, LeafMetric::absent()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[dec!(80), dec!(60)]), Some(dec!(70)));
    }

    #[test]
    fn absent_for_covers_every_leaf() {
        let map = absent_for(&[NodeId(2), NodeId(1), NodeId(2)]);
        assert_eq!(map.len(), 2);
        assert!(map.values().all(|m| !m.present));
    }
}
