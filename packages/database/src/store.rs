//! [`GeographyTree`] and record source implementations over a database.

use std::sync::Arc;

use async_trait::async_trait;
use sanitation_geography::{GeoError, GeographyTree};
use sanitation_geography_models::{DateRange, GeographyNode, Level, NodeId};
use sanitation_metrics::{ContractorSource, InspectionSource, ProviderError, SurveySource};
use sanitation_metrics_models::{ContractorRecord, InspectionRecord, SurveyRecord};
use switchy_database::Database;

use crate::queries;

/// Shared handle that serves hierarchy and record reads from one connection.
#[derive(Clone)]
pub struct DbStore {
    db: Arc<dyn Database>,
}

impl DbStore {
    #[must_use]
    pub fn new(db: Box<dyn Database>) -> Self {
        Self { db: Arc::from(db) }
    }

    /// The underlying connection.
    #[must_use]
    pub fn database(&self) -> &dyn Database {
        self.db.as_ref()
    }
}

impl std::fmt::Debug for DbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl GeographyTree for DbStore {
    async fn nodes(&self, ids: &[NodeId]) -> Result<Vec<GeographyNode>, GeoError> {
        Ok(queries::nodes_by_id(self.database(), ids).await?)
    }

    async fn children_of(
        &self,
        parent_ids: &[NodeId],
        child_level: Level,
    ) -> Result<Vec<GeographyNode>, GeoError> {
        Ok(queries::children_of(self.database(), parent_ids, child_level).await?)
    }
}

#[async_trait]
impl InspectionSource for DbStore {
    async fn inspections(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<Vec<InspectionRecord>, ProviderError> {
        Ok(queries::inspections_for(self.database(), leaf_ids, range).await?)
    }
}

#[async_trait]
impl SurveySource for DbStore {
    async fn surveys(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<Vec<SurveyRecord>, ProviderError> {
        Ok(queries::surveys_for(self.database(), leaf_ids, range).await?)
    }
}

#[async_trait]
impl ContractorSource for DbStore {
    async fn contractors(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<Vec<ContractorRecord>, ProviderError> {
        Ok(queries::contractors_for(self.database(), leaf_ids, range).await?)
    }
}
