//! Raw SQL reads.
//!
//! Every batch read splits its ids into chunks of [`MAX_IDS_PER_QUERY`] and
//! issues one `IN (...)` query per chunk. Dates and amounts are selected as
//! text and parsed here.

use std::collections::BTreeMap;
use std::str::FromStr as _;

use chrono::{NaiveDate, NaiveTime};
use moosicbox_json_utils::database::ToValue as _;
use rust_decimal::Decimal;
use sanitation_geography_models::{DateRange, GeographyNode, Level, NodeId};
use sanitation_metrics_models::{
    ContractorRecord, InspectionChecklist, InspectionRecord, Scheme, SchemeProgress, SurveyRecord,
};
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

/// Upper bound on bound parameters per `IN (...)` list. Stays well under
/// `SQLite`'s default host parameter limit.
pub const MAX_IDS_PER_QUERY: usize = 500;

/// Formats a date the way it is stored and compared.
#[must_use]
pub fn date_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Builds `$first, $first+1, ...` for `ids` and the matching parameters.
fn id_list(ids: &[i64], first: usize) -> (String, Vec<DatabaseValue>) {
    let placeholders = (0..ids.len())
        .map(|i| format!("${}", first + i))
        .collect::<Vec<_>>()
        .join(", ");
    let params = ids.iter().map(|id| DatabaseValue::Int64(*id)).collect();
    (placeholders, params)
}

/// Appends inclusive bounds on a text date column.
fn push_date_bounds(
    sql: &mut String,
    params: &mut Vec<DatabaseValue>,
    column: &str,
    range: &DateRange,
) {
    if let Some(start) = range.start {
        params.push(DatabaseValue::String(date_text(start)));
        sql.push_str(&format!(" AND CAST({column} AS TEXT) >= ${}", params.len()));
    }
    if let Some(end) = range.end {
        params.push(DatabaseValue::String(date_text(end)));
        sql.push_str(&format!(" AND CAST({column} AS TEXT) <= ${}", params.len()));
    }
}

fn conversion(message: String) -> DbError {
    DbError::Conversion { message }
}

fn read_i64(row: &Row, column: &str) -> Result<i64, DbError> {
    row.to_value(column)
        .map_err(|e| conversion(format!("Failed to read column {column}: {e}")))
}

fn read_opt_i64(row: &Row, column: &str) -> Result<Option<i64>, DbError> {
    row.to_value(column)
        .map_err(|e| conversion(format!("Failed to read column {column}: {e}")))
}

fn read_string(row: &Row, column: &str) -> Result<String, DbError> {
    row.to_value(column)
        .map_err(|e| conversion(format!("Failed to read column {column}: {e}")))
}

fn read_opt_string(row: &Row, column: &str) -> Result<Option<String>, DbError> {
    row.to_value(column)
        .map_err(|e| conversion(format!("Failed to read column {column}: {e}")))
}

fn parse_date(raw: &str, column: &str) -> Result<NaiveDate, DbError> {
    // Postgres renders timestamps with a time suffix; the date is the prefix.
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| conversion(format!("Invalid {column} {raw:?}: {e}")))
}

fn parse_optional_date(raw: Option<String>, column: &str) -> Result<Option<NaiveDate>, DbError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse_date(&s, column))
        .transpose()
}

fn parse_decimal(raw: &str, column: &str) -> Result<Decimal, DbError> {
    Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .map_err(|e| conversion(format!("Invalid {column} {raw:?}: {e}")))
}

fn node_from_row(row: &Row) -> Result<GeographyNode, DbError> {
    let id = read_i64(row, "id")?;
    let level = read_string(row, "level")?;
    let parent_id = read_opt_i64(row, "parent_id")?;
    let name = read_opt_string(row, "name")?;

    let level = Level::from_str(&level)
        .map_err(|_| conversion(format!("Unknown level {level:?} on node {id}")))?;

    Ok(GeographyNode {
        id: NodeId(id),
        level,
        parent_id: parent_id.map(NodeId),
        name: name.unwrap_or_default(),
    })
}

fn raw_ids(ids: &[NodeId]) -> Vec<i64> {
    ids.iter().map(|id| id.value()).collect()
}

/// Looks up nodes by id. Unknown ids are silently absent.
///
/// # Errors
///
/// Returns [`DbError`] if a query fails or a row is malformed.
pub async fn nodes_by_id(
    db: &dyn Database,
    ids: &[NodeId],
) -> Result<Vec<GeographyNode>, DbError> {
    let mut nodes = Vec::with_capacity(ids.len());

    for chunk in raw_ids(ids).chunks(MAX_IDS_PER_QUERY) {
        let (list, params) = id_list(chunk, 1);
        let sql = format!(
            "SELECT id, level, parent_id, name FROM geographies WHERE id IN ({list}) ORDER BY id"
        );
        for row in db.query_raw_params(&sql, &params).await? {
            nodes.push(node_from_row(&row)?);
        }
    }

    Ok(nodes)
}

/// Returns all nodes at `level` whose parent is in `parent_ids`.
///
/// # Errors
///
/// Returns [`DbError`] if a query fails or a row is malformed.
pub async fn children_of(
    db: &dyn Database,
    parent_ids: &[NodeId],
    level: Level,
) -> Result<Vec<GeographyNode>, DbError> {
    let mut nodes = Vec::new();

    for chunk in raw_ids(parent_ids).chunks(MAX_IDS_PER_QUERY) {
        let (list, mut params) = id_list(chunk, 1);
        params.push(DatabaseValue::String(level.as_ref().to_string()));
        let sql = format!(
            "SELECT id, level, parent_id, name FROM geographies
             WHERE parent_id IN ({list}) AND level = ${}
             ORDER BY id",
            params.len()
        );
        for row in db.query_raw_params(&sql, &params).await? {
            nodes.push(node_from_row(&row)?);
        }
    }

    Ok(nodes)
}

/// Inspections of `leaf_ids` dated inside `range`.
///
/// # Errors
///
/// Returns [`DbError`] if a query fails or a row is malformed, including a
/// checklist that is not valid JSON.
pub async fn inspections_for(
    db: &dyn Database,
    leaf_ids: &[NodeId],
    range: &DateRange,
) -> Result<Vec<InspectionRecord>, DbError> {
    let mut records = Vec::new();

    for chunk in raw_ids(leaf_ids).chunks(MAX_IDS_PER_QUERY) {
        let (list, mut params) = id_list(chunk, 1);
        let mut sql = format!(
            "SELECT id, gp_id,
                    CAST(inspection_date AS TEXT) AS inspection_date,
                    CAST(start_time AS TEXT) AS start_time,
                    CAST(checklist AS TEXT) AS checklist
             FROM inspections
             WHERE gp_id IN ({list})"
        );
        push_date_bounds(&mut sql, &mut params, "inspection_date", range);

        for row in db.query_raw_params(&sql, &params).await? {
            let id = read_i64(&row, "id")?;
            let gp_id = read_i64(&row, "gp_id")?;
            let date = read_string(&row, "inspection_date")?;
            let start_time = read_opt_string(&row, "start_time")?;
            let checklist = read_opt_string(&row, "checklist")?;

            let checklist: InspectionChecklist = match checklist.as_deref() {
                None | Some("") => InspectionChecklist::default(),
                Some(json) => serde_json::from_str(json).map_err(|e| {
                    conversion(format!("Invalid checklist on inspection {id}: {e}"))
                })?,
            };

            let start_time = start_time
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    NaiveTime::from_str(s.trim())
                        .map_err(|e| conversion(format!("Invalid start_time {s:?}: {e}")))
                })
                .transpose()?;

            records.push(InspectionRecord {
                id,
                leaf_id: NodeId(gp_id),
                date: parse_date(&date, "inspection_date")?,
                start_time,
                checklist,
            });
        }
    }

    records.sort_by_key(|r| r.id);
    Ok(records)
}

/// Annual surveys of `leaf_ids` filed inside `range`, with their scheme
/// rows.
///
/// # Errors
///
/// Returns [`DbError`] if a query fails or a row is malformed, including a
/// scheme name outside [`Scheme`].
pub async fn surveys_for(
    db: &dyn Database,
    leaf_ids: &[NodeId],
    range: &DateRange,
) -> Result<Vec<SurveyRecord>, DbError> {
    let mut surveys: BTreeMap<i64, SurveyRecord> = BTreeMap::new();

    for chunk in raw_ids(leaf_ids).chunks(MAX_IDS_PER_QUERY) {
        let (list, mut params) = id_list(chunk, 1);
        let mut sql = format!(
            "SELECT id, gp_id, CAST(survey_date AS TEXT) AS survey_date
             FROM annual_surveys
             WHERE gp_id IN ({list})"
        );
        push_date_bounds(&mut sql, &mut params, "survey_date", range);

        for row in db.query_raw_params(&sql, &params).await? {
            let id = read_i64(&row, "id")?;
            let gp_id = read_i64(&row, "gp_id")?;
            let date = read_string(&row, "survey_date")?;
            surveys.insert(
                id,
                SurveyRecord {
                    id,
                    leaf_id: NodeId(gp_id),
                    surveyed_on: parse_date(&date, "survey_date")?,
                    schemes: Vec::new(),
                },
            );
        }
    }

    let survey_ids: Vec<i64> = surveys.keys().copied().collect();
    for chunk in survey_ids.chunks(MAX_IDS_PER_QUERY) {
        let (list, params) = id_list(chunk, 1);
        let sql = format!(
            "SELECT survey_id, scheme,
                    CAST(target AS TEXT) AS target,
                    CAST(achievement AS TEXT) AS achievement
             FROM survey_schemes
             WHERE survey_id IN ({list})
             ORDER BY survey_id, scheme"
        );

        for row in db.query_raw_params(&sql, &params).await? {
            let survey_id = read_i64(&row, "survey_id")?;
            let scheme = read_string(&row, "scheme")?;
            let target = read_string(&row, "target")?;
            let achievement = read_string(&row, "achievement")?;

            let scheme = Scheme::from_str(scheme.trim()).map_err(|_| {
                conversion(format!("Unknown scheme {scheme:?} on survey {survey_id}"))
            })?;
            let Some(survey) = surveys.get_mut(&survey_id) else {
                continue;
            };
            survey.schemes.push(SchemeProgress {
                scheme,
                target: parse_decimal(&target, "target")?,
                achievement: parse_decimal(&achievement, "achievement")?,
            });
        }
    }

    Ok(surveys.into_values().collect())
}

/// Contracts of `leaf_ids` whose term overlaps `range`. Open ends are
/// stored as NULL.
///
/// # Errors
///
/// Returns [`DbError`] if a query fails or a row is malformed.
pub async fn contractors_for(
    db: &dyn Database,
    leaf_ids: &[NodeId],
    range: &DateRange,
) -> Result<Vec<ContractorRecord>, DbError> {
    let mut records = Vec::new();

    for chunk in raw_ids(leaf_ids).chunks(MAX_IDS_PER_QUERY) {
        let (list, mut params) = id_list(chunk, 1);
        let mut sql = format!(
            "SELECT id, gp_id, agency_name,
                    CAST(contract_start_date AS TEXT) AS contract_start_date,
                    CAST(contract_end_date AS TEXT) AS contract_end_date,
                    CAST(contract_amount AS TEXT) AS contract_amount
             FROM contractors
             WHERE gp_id IN ({list})"
        );
        if let Some(end) = range.end {
            params.push(DatabaseValue::String(date_text(end)));
            sql.push_str(&format!(
                " AND (contract_start_date IS NULL OR CAST(contract_start_date AS TEXT) <= ${})",
                params.len()
            ));
        }
        if let Some(start) = range.start {
            params.push(DatabaseValue::String(date_text(start)));
            sql.push_str(&format!(
                " AND (contract_end_date IS NULL OR CAST(contract_end_date AS TEXT) >= ${})",
                params.len()
            ));
        }

        for row in db.query_raw_params(&sql, &params).await? {
            let id = read_i64(&row, "id")?;
            let gp_id = read_i64(&row, "gp_id")?;
            let agency_name = read_opt_string(&row, "agency_name")?;
            let start = read_opt_string(&row, "contract_start_date")?;
            let end = read_opt_string(&row, "contract_end_date")?;
            let amount = read_opt_string(&row, "contract_amount")?;

            records.push(ContractorRecord {
                id,
                leaf_id: NodeId(gp_id),
                agency_name,
                contract_start: parse_optional_date(start, "contract_start_date")?,
                contract_end: parse_optional_date(end, "contract_end_date")?,
                contract_amount: amount
                    .map(|a| parse_decimal(&a, "contract_amount"))
                    .transpose()?
                    .unwrap_or_default(),
            });
        }
    }

    records.sort_by_key(|r| r.id);
    Ok(records)
}
