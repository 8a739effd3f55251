//! The `survey-schemes` subcommand: scheme-wise achievement summed over
//! every village under a node.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sanitation_database::DbStore;
use sanitation_formula::round2;
use sanitation_formula::survey::{overall_achievement_rate, scheme_breakdown};
use sanitation_geography::GeographyTree;
use sanitation_geography_models::{DateRange, Level, NodeId};
use sanitation_metrics::SurveySource;
use sanitation_metrics_models::{Scheme, SchemeProgress};
use serde::Serialize;

use crate::coverage::Backend;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone)]
pub struct SchemeRequest {
    pub ids: Vec<NodeId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub backend: Backend,
}

/// Survey totals of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeSummary {
    pub node_id: NodeId,
    pub level: Level,
    /// Villages under the node.
    pub villages: usize,
    /// Surveys filed in range by those villages.
    pub surveys: usize,
    /// Total achievement over total target across every scheme, 2 dp.
    pub overall_rate: Decimal,
    /// Per-scheme achievement over the summed targets, 2 dp.
    pub schemes: BTreeMap<Scheme, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeReport {
    pub range: DateRange,
    pub results: Vec<SchemeSummary>,
    pub not_found: Vec<NodeId>,
}

/// Runs the breakdown described by `request`.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened, the range is
/// inverted, or a read fails.
pub async fn run(request: &SchemeRequest) -> Result<SchemeReport, Box<dyn std::error::Error>> {
    let range = DateRange::new(request.from, request.to)?;

    match &request.backend {
        Backend::Snapshot(path) => {
            let (tree, records) = Snapshot::load(path)?.into_parts()?;
            summarize(&tree, &records, &request.ids, range).await
        }
        Backend::Sqlite(path) => {
            let store = DbStore::new(sanitation_database::open_sqlite(path).await?);
            summarize(&store, &store, &request.ids, range).await
        }
        Backend::Postgres => {
            let store = DbStore::new(sanitation_database::connect_from_env().await?);
            summarize(&store, &store, &request.ids, range).await
        }
    }
}

/// Sums the scheme rows of every survey under each requested node.
/// Requested ids keep their order; repeats are reported once.
pub async fn summarize(
    tree: &dyn GeographyTree,
    source: &dyn SurveySource,
    ids: &[NodeId],
    range: DateRange,
) -> Result<SchemeReport, Box<dyn std::error::Error>> {
    let known: BTreeMap<NodeId, Level> = tree
        .nodes(ids)
        .await?
        .into_iter()
        .map(|n| (n.id, n.level))
        .collect();

    let mut seen = BTreeSet::new();
    let mut results = Vec::new();
    let mut not_found = Vec::new();

    for id in ids {
        if !seen.insert(*id) {
            continue;
        }
        let Some(level) = known.get(id).copied() else {
            not_found.push(*id);
            continue;
        };

        let leaves = tree.all_leaves_under(*id).await?;
        let surveys = source.surveys(&leaves, &range).await?;
        let schemes: Vec<SchemeProgress> = surveys
            .iter()
            .flat_map(|s| s.schemes.iter().copied())
            .collect();
        log::debug!(
            "summarize: node {id} has {} surveys across {} villages",
            surveys.len(),
            leaves.len()
        );

        results.push(SchemeSummary {
            node_id: *id,
            level,
            villages: leaves.len(),
            surveys: surveys.len(),
            overall_rate: round2(overall_achievement_rate(&schemes)),
            schemes: scheme_breakdown(&schemes),
        });
    }

    Ok(SchemeReport {
        range,
        results,
        not_found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot() -> Snapshot {
        Snapshot::from_json(
            r#"{
                "nodes": [
                    {"id": 1, "level": "STATE", "parentId": null},
                    {"id": 10, "level": "DISTRICT", "parentId": 1},
                    {"id": 100, "level": "BLOCK", "parentId": 10},
                    {"id": 1000, "level": "VILLAGE", "parentId": 100},
                    {"id": 1001, "level": "VILLAGE", "parentId": 100}
                ],
                "surveys": [
                    {"id": 1, "leafId": 1000, "surveyedOn": "2025-05-01", "schemes": [
                        {"scheme": "IHHL", "target": "10", "achievement": "5"},
                        {"scheme": "CSC", "target": "2", "achievement": "2"}
                    ]},
                    {"id": 2, "leafId": 1001, "surveyedOn": "2025-06-01", "schemes": [
                        {"scheme": "IHHL", "target": "30", "achievement": "25"}
                    ]},
                    {"id": 3, "leafId": 1001, "surveyedOn": "2024-06-01", "schemes": [
                        {"scheme": "RRC", "target": "1", "achievement": "0"}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn district_sums_targets_before_dividing() {
        let (tree, records) = snapshot().into_parts().unwrap();
        let range = DateRange::new(NaiveDate::from_ymd_opt(2025, 1, 1), None).unwrap();

        let report = summarize(&tree, &records, &[NodeId(10), NodeId(99), NodeId(10)], range)
            .await
            .unwrap();

        assert_eq!(report.not_found, vec![NodeId(99)]);
        assert_eq!(report.results.len(), 1);
        let district = &report.results[0];
        assert_eq!(district.level, Level::District);
        assert_eq!(district.villages, 2);
        assert_eq!(district.surveys, 2);
        // 30 of 40 IHHL, not the mean of 50% and 83.33%.
        assert_eq!(district.schemes[&Scheme::Ihhl], dec!(75.00));
        assert_eq!(district.schemes[&Scheme::Csc], dec!(100.00));
        assert!(!district.schemes.contains_key(&Scheme::Rrc));
        // 32 of 42.
        assert_eq!(district.overall_rate, dec!(76.19));
    }

    #[tokio::test]
    async fn node_without_surveys_reports_zero() {
        let (tree, records) = snapshot().into_parts().unwrap();
        let range = DateRange::new(None, NaiveDate::from_ymd_opt(2023, 12, 31)).unwrap();

        let report = summarize(&tree, &records, &[NodeId(100)], range)
            .await
            .unwrap();
        let block = &report.results[0];
        assert_eq!(block.surveys, 0);
        assert_eq!(block.overall_rate, Decimal::ZERO);
        assert!(block.schemes.is_empty());
    }
}
