//! Read-side tables.
//!
//! Production Postgres owns its schema through the portal's own migrations;
//! these statements only bootstrap local `SQLite` snapshots with the columns
//! the adapter reads.

use switchy_database::Database;

use crate::DbError;

const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS geographies (
        id        INTEGER PRIMARY KEY,
        level     TEXT NOT NULL,
        parent_id INTEGER REFERENCES geographies(id),
        name      TEXT NOT NULL DEFAULT ''
    )",
    "CREATE INDEX IF NOT EXISTS idx_geographies_parent
     ON geographies (parent_id, level)",
    "CREATE TABLE IF NOT EXISTS inspections (
        id              INTEGER PRIMARY KEY,
        gp_id           INTEGER NOT NULL REFERENCES geographies(id),
        inspection_date TEXT NOT NULL,
        start_time      TEXT,
        checklist       TEXT NOT NULL DEFAULT '{}'
    )",
    "CREATE INDEX IF NOT EXISTS idx_inspections_gp
     ON inspections (gp_id, inspection_date)",
    "CREATE TABLE IF NOT EXISTS annual_surveys (
        id          INTEGER PRIMARY KEY,
        gp_id       INTEGER NOT NULL REFERENCES geographies(id),
        survey_date TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_annual_surveys_gp
     ON annual_surveys (gp_id, survey_date)",
    "CREATE TABLE IF NOT EXISTS survey_schemes (
        survey_id   INTEGER NOT NULL REFERENCES annual_surveys(id),
        scheme      TEXT NOT NULL,
        target      TEXT NOT NULL DEFAULT '0',
        achievement TEXT NOT NULL DEFAULT '0',
        PRIMARY KEY (survey_id, scheme)
    )",
    "CREATE TABLE IF NOT EXISTS contractors (
        id                  INTEGER PRIMARY KEY,
        gp_id               INTEGER NOT NULL REFERENCES geographies(id),
        agency_name         TEXT,
        contract_start_date TEXT,
        contract_end_date   TEXT,
        contract_amount     TEXT NOT NULL DEFAULT '0'
    )",
    "CREATE INDEX IF NOT EXISTS idx_contractors_gp
     ON contractors (gp_id)",
];

/// Creates all read tables if they don't already exist.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails.
pub async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    for statement in STATEMENTS {
        db.exec_raw(statement).await?;
    }
    log::debug!("Schema ready ({} statements)", STATEMENTS.len());
    Ok(())
}
