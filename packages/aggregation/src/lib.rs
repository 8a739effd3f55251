#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hierarchical coverage and score aggregation.
//!
//! [`Aggregator`] rolls per-village metrics up the administrative tree one
//! level at a time. The same fold runs at every level and for every metric
//! domain; only the [`MetricProvider`](sanitation_metrics::MetricProvider)
//! changes. Single-node queries go through the batch path, so asking for one
//! node and asking for it inside a batch always produce the same numbers.

pub mod config;
pub mod engine;
pub mod fold;

#[cfg(test)]
mod fixtures;

pub use config::AggregatorConfig;
pub use engine::Aggregator;
pub use sanitation_aggregation_models::{AggregateOutcome, CoverageResult, NodeError};
pub use tokio_util::sync::CancellationToken;

use sanitation_geography::GeoError;
use sanitation_geography_models::NodeId;
use sanitation_metrics::ProviderError;
use thiserror::Error;

/// Errors that abort an aggregation call.
///
/// Unknown ids inside a batch are not errors; they are reported in
/// [`AggregateOutcome::failures`].
#[derive(Debug, Error)]
pub enum AggregationError {
    /// The request itself is malformed.
    #[error("Validation error: {message}")]
    Validation {
        /// What is wrong with the request.
        message: String,
    },

    /// A single-node query named an unknown node.
    #[error("Node {id} not found")]
    NotFound {
        /// The unknown id.
        id: NodeId,
    },

    /// Leaf metrics could not be read.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The hierarchy could not be read.
    #[error("Geography error: {0}")]
    Geography(#[from] GeoError),

    /// The caller cancelled the call before it finished.
    #[error("Aggregation cancelled")]
    Cancelled,
}
