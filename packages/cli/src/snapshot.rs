//! JSON snapshots: a hierarchy plus the records hanging off its villages.

use std::path::Path;

use sanitation_geography::InMemoryGeography;
use sanitation_geography_models::GeographyNode;
use sanitation_metrics::MemoryRecords;
use serde::{Deserialize, Serialize};

/// Everything needed to run an aggregation without a database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub nodes: Vec<GeographyNode>,
    #[serde(flatten)]
    pub records: MemoryRecords,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let snapshot = Self::from_json(&json)
            .map_err(|e| format!("Invalid snapshot {}: {e}", path.display()))?;

        log::debug!(
            "Loaded snapshot {}: {} nodes, {} inspections, {} surveys, {} contractors",
            path.display(),
            snapshot.nodes.len(),
            snapshot.records.inspections.len(),
            snapshot.records.surveys.len(),
            snapshot.records.contractors.len()
        );

        Ok(snapshot)
    }

    /// Validates the hierarchy and splits the snapshot into its tree and
    /// records.
    pub fn into_parts(
        self,
    ) -> Result<(InMemoryGeography, MemoryRecords), sanitation_geography::GeoError> {
        Ok((InMemoryGeography::new(self.nodes)?, self.records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sanitation_geography_models::{Level, NodeId};

    #[test]
    fn records_sit_beside_nodes() {
        let json = r#"{
            "nodes": [
                {"id": 1, "level": "STATE", "parentId": null, "name": "State"},
                {"id": 10, "level": "DISTRICT", "parentId": 1, "name": "District"}
            ],
            "contractors": [
                {"id": 3, "leafId": 10, "contractStart": null, "contractEnd": null,
                 "contractAmount": "1000"}
            ]
        }"#;

        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[1].level, Level::District);
        assert_eq!(snapshot.nodes[1].parent_id, Some(NodeId(1)));
        assert!(snapshot.records.inspections.is_empty());
        assert_eq!(snapshot.records.contractors.len(), 1);
    }

    #[test]
    fn orphaned_node_is_rejected() {
        let json = r#"{"nodes": [{"id": 10, "level": "DISTRICT", "parentId": 1, "name": ""}]}"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert!(snapshot.into_parts().is_err());
    }
}
