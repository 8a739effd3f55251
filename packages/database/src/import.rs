//! Bulk writes used to load snapshots into a local database.
//!
//! Every insert is `ON CONFLICT DO NOTHING`, so re-importing the same
//! snapshot leaves existing rows untouched.

use sanitation_geography_models::GeographyNode;
use sanitation_metrics::MemoryRecords;
use sanitation_metrics_models::{ContractorRecord, InspectionRecord, SurveyRecord};
use switchy_database::{Database, DatabaseValue};

use crate::DbError;
use crate::queries::date_text;

/// Rows written by [`import_snapshot`], per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub nodes: u64,
    pub inspections: u64,
    pub surveys: u64,
    pub contractors: u64,
}

fn optional_text(value: Option<String>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, DatabaseValue::String)
}

/// Inserts hierarchy nodes. Parents must come before their children when
/// the backend enforces foreign keys.
///
/// # Errors
///
/// Returns [`DbError`] if any insert fails.
pub async fn insert_nodes(db: &dyn Database, nodes: &[GeographyNode]) -> Result<u64, DbError> {
    let mut inserted = 0u64;

    for node in nodes {
        inserted += db
            .exec_raw_params(
                "INSERT INTO geographies (id, level, parent_id, name)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (id) DO NOTHING",
                &[
                    DatabaseValue::Int64(node.id.value()),
                    DatabaseValue::String(node.level.as_ref().to_string()),
                    node.parent_id
                        .map_or(DatabaseValue::Null, |p| DatabaseValue::Int64(p.value())),
                    DatabaseValue::String(node.name.clone()),
                ],
            )
            .await?;
    }

    Ok(inserted)
}

/// Inserts inspections with their checklist serialized as JSON.
///
/// # Errors
///
/// Returns [`DbError`] if a checklist cannot be serialized or an insert
/// fails.
pub async fn insert_inspections(
    db: &dyn Database,
    records: &[InspectionRecord],
) -> Result<u64, DbError> {
    let mut inserted = 0u64;

    for record in records {
        let checklist =
            serde_json::to_string(&record.checklist).map_err(|e| DbError::Conversion {
                message: format!("Failed to serialize checklist of inspection {}: {e}", record.id),
            })?;

        inserted += db
            .exec_raw_params(
                "INSERT INTO inspections (id, gp_id, inspection_date, start_time, checklist)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (id) DO NOTHING",
                &[
                    DatabaseValue::Int64(record.id),
                    DatabaseValue::Int64(record.leaf_id.value()),
                    DatabaseValue::String(date_text(record.date)),
                    optional_text(record.start_time.map(|t| t.format("%H:%M:%S").to_string())),
                    DatabaseValue::String(checklist),
                ],
            )
            .await?;
    }

    Ok(inserted)
}

/// Inserts surveys and one `survey_schemes` row per scheme.
///
/// # Errors
///
/// Returns [`DbError`] if any insert fails.
pub async fn insert_surveys(db: &dyn Database, records: &[SurveyRecord]) -> Result<u64, DbError> {
    let mut inserted = 0u64;

    for record in records {
        inserted += db
            .exec_raw_params(
                "INSERT INTO annual_surveys (id, gp_id, survey_date)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (id) DO NOTHING",
                &[
                    DatabaseValue::Int64(record.id),
                    DatabaseValue::Int64(record.leaf_id.value()),
                    DatabaseValue::String(date_text(record.surveyed_on)),
                ],
            )
            .await?;

        for progress in &record.schemes {
            db.exec_raw_params(
                "INSERT INTO survey_schemes (survey_id, scheme, target, achievement)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (survey_id, scheme) DO NOTHING",
                &[
                    DatabaseValue::Int64(record.id),
                    DatabaseValue::String(progress.scheme.as_ref().to_string()),
                    DatabaseValue::String(progress.target.to_string()),
                    DatabaseValue::String(progress.achievement.to_string()),
                ],
            )
            .await?;
        }
    }

    Ok(inserted)
}

/// Inserts contractor assignments. Open contract ends are stored as NULL.
///
/// # Errors
///
/// Returns [`DbError`] if any insert fails.
pub async fn insert_contractors(
    db: &dyn Database,
    records: &[ContractorRecord],
) -> Result<u64, DbError> {
    let mut inserted = 0u64;

    for record in records {
        inserted += db
            .exec_raw_params(
                "INSERT INTO contractors (
                    id, gp_id, agency_name, contract_start_date, contract_end_date,
                    contract_amount
                 ) VALUES ($1, $2, $3, $4, $5, $6)
                 ON CONFLICT (id) DO NOTHING",
                &[
                    DatabaseValue::Int64(record.id),
                    DatabaseValue::Int64(record.leaf_id.value()),
                    optional_text(record.agency_name.clone()),
                    optional_text(record.contract_start.map(date_text)),
                    optional_text(record.contract_end.map(date_text)),
                    DatabaseValue::String(record.contract_amount.to_string()),
                ],
            )
            .await?;
    }

    Ok(inserted)
}

/// Writes a full snapshot: the hierarchy first, then every record kind.
///
/// # Errors
///
/// Returns [`DbError`] if any insert fails. Rows written before the failure
/// are kept.
pub async fn import_snapshot(
    db: &dyn Database,
    nodes: &[GeographyNode],
    records: &MemoryRecords,
) -> Result<ImportCounts, DbError> {
    let mut ordered = nodes.to_vec();
    ordered.sort_by_key(|n| (n.level, n.id));

    let counts = ImportCounts {
        nodes: insert_nodes(db, &ordered).await?,
        inspections: insert_inspections(db, &records.inspections).await?,
        surveys: insert_surveys(db, &records.surveys).await?,
        contractors: insert_contractors(db, &records.contractors).await?,
    };

    log::info!(
        "Imported {} nodes, {} inspections, {} surveys, {} contractors",
        counts.nodes,
        counts.inspections,
        counts.surveys,
        counts.contractors
    );

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sanitation_geography_models::{Level, NodeId};

    fn node(id: i64, level: Level, parent: Option<i64>) -> GeographyNode {
        GeographyNode {
            id: NodeId(id),
            level,
            parent_id: parent.map(NodeId),
            name: String::new(),
        }
    }

    #[tokio::test]
    async fn reimport_skips_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = crate::open_sqlite(&dir.path().join("nested/snapshot.db"))
            .await
            .unwrap();

        // Children listed first; the import orders by level.
        let nodes = vec![
            node(1000, Level::Village, Some(100)),
            node(100, Level::Block, Some(10)),
            node(10, Level::District, Some(1)),
            node(1, Level::State, None),
        ];
        let records = MemoryRecords {
            contractors: vec![ContractorRecord {
                id: 1,
                leaf_id: NodeId(1000),
                agency_name: None,
                contract_start: NaiveDate::from_ymd_opt(2025, 1, 1),
                contract_end: None,
                contract_amount: dec!(250000),
            }],
            ..MemoryRecords::default()
        };

        let first = import_snapshot(db.as_ref(), &nodes, &records).await.unwrap();
        assert_eq!(
            first,
            ImportCounts {
                nodes: 4,
                inspections: 0,
                surveys: 0,
                contractors: 1,
            }
        );

        let second = import_snapshot(db.as_ref(), &nodes, &records).await.unwrap();
        assert_eq!(second, ImportCounts::default());
    }
}
