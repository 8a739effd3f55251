//! In-memory record store used for JSON snapshots and tests.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sanitation_geography_models::{DateRange, NodeId};
use sanitation_metrics_models::{ContractorRecord, InspectionRecord, SurveyRecord};
use serde::{Deserialize, Serialize};

use crate::{ContractorSource, InspectionSource, ProviderError, SurveySource};

/// Every record kind held in plain vectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecords {
    /// Field inspections.
    #[serde(default)]
    pub inspections: Vec<InspectionRecord>,
    /// Annual surveys.
    #[serde(default)]
    pub surveys: Vec<SurveyRecord>,
    /// Contractor assignments.
    #[serde(default)]
    pub contractors: Vec<ContractorRecord>,
}

#[async_trait]
impl InspectionSource for MemoryRecords {
    async fn inspections(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<Vec<InspectionRecord>, ProviderError> {
        let wanted: BTreeSet<NodeId> = leaf_ids.iter().copied().collect();
        Ok(self
            .inspections
            .iter()
            .filter(|r| wanted.contains(&r.leaf_id) && range.contains(r.date))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SurveySource for MemoryRecords {
    async fn surveys(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<Vec<SurveyRecord>, ProviderError> {
        let wanted: BTreeSet<NodeId> = leaf_ids.iter().copied().collect();
        Ok(self
            .surveys
            .iter()
            .filter(|r| wanted.contains(&r.leaf_id) && range.contains(r.surveyed_on))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ContractorSource for MemoryRecords {
    async fn contractors(
        &self,
        leaf_ids: &[NodeId],
        range: &DateRange,
    ) -> Result<Vec<ContractorRecord>, ProviderError> {
        let wanted: BTreeSet<NodeId> = leaf_ids.iter().copied().collect();
        Ok(self
            .contractors
            .iter()
            .filter(|r| {
                wanted.contains(&r.leaf_id) && range.overlaps(r.contract_start, r.contract_end)
            })
            .cloned()
            .collect())
    }
}
