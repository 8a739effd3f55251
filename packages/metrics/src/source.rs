//! Record read interfaces consumed by the providers.
//!
//! Implementations may return records outside the requested leaves or date
//! range; providers filter again before reducing.

use async_trait::async_trait;
use sanitation_geography_models::{DateRange, NodeId};
use sanitation_metrics_models::{ContractorRecord, InspectionRecord, SurveyRecord};

use crate::ProviderError;

/// Reads inspections.
#[async_trait]
pub trait InspectionSource: Send + Sync {
    /// Inspections of `leaf_ids` dated inside `range`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the store cannot be read.
    async fn inspections(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<Vec<InspectionRecord>, ProviderError>;
}

/// Reads annual surveys.
#[async_trait]
pub trait SurveySource: Send + Sync {
    /// Surveys of `leaf_ids` filed inside `range`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the store cannot be read.
    async fn surveys(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<Vec<SurveyRecord>, ProviderError>;
}

/// Reads contractor assignments.
#[async_trait]
pub trait ContractorSource: Send + Sync {
    /// Contracts of `leaf_ids` whose term overlaps `range`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the store cannot be read.
    async fn contractors(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<Vec<ContractorRecord>, ProviderError>;
}
