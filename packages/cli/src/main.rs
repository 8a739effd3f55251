#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the coverage engine.
//!
//! ```text
//! sanitation_cli coverage --domain inspection --level district --ids 10,11 \
//!     [--from 2025-04-01] [--to 2026-03-31] [--snapshot data.json | --sqlite data.db] [--top 5]
//! sanitation_cli survey-schemes --ids 10 [--from ..] [--to ..] [--snapshot data.json]
//! sanitation_cli inspection-score --checklist inspection.json
//! sanitation_cli complaint-score --total 100 --resolved 85 --avg-seconds 302400
//! sanitation_cli complaint-score --complaints complaints.json
//! sanitation_cli fund-metrics --sanctioned 50000000 --work-orders 37500000 --households 1200
//! sanitation_cli import --snapshot data.json --sqlite data.db
//! ```
//!
//! Without `--snapshot` or `--sqlite`, `coverage` and `survey-schemes` read
//! from the Postgres database named by `DATABASE_URL`. Ctrl-C cancels a
//! running aggregation.

mod complaints;
mod coverage;
mod funds;
mod report;
mod schemes;
mod snapshot;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sanitation_aggregation::CancellationToken;
use sanitation_formula::{ComplaintScore, ScoringRubric, score_inspection};
use sanitation_geography::InMemoryGeography;
use sanitation_geography_models::{Level, NodeId};
use sanitation_metrics_models::InspectionChecklist;

use crate::coverage::{Backend, CoverageRequest, Domain};
use crate::funds::FundSummary;
use crate::schemes::SchemeRequest;
use crate::snapshot::Snapshot;

#[derive(Parser)]
#[command(
    name = "sanitation_cli",
    about = "Roll up village coverage and scores across the administrative tree"
)]
struct Cli {
    /// Scoring rubric TOML overriding the built-in one
    #[arg(long, global = true)]
    rubric: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate coverage for nodes at one level
    Coverage {
        /// Leaf metric to roll up
        #[arg(long, value_enum)]
        domain: Domain,
        /// Level of every requested node (state, district, block, village)
        #[arg(long)]
        level: Level,
        /// Comma-separated node ids
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
        /// First day of the date range (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day of the date range (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Read hierarchy and records from a JSON snapshot
        #[arg(long, conflicts_with = "sqlite")]
        snapshot: Option<PathBuf>,
        /// Read hierarchy and records from a local `SQLite` database
        #[arg(long)]
        sqlite: Option<PathBuf>,
        /// Also rank the nodes and list the best N
        #[arg(long)]
        top: Option<usize>,
    },
    /// Sum survey scheme targets and achievements under each node
    SurveySchemes {
        /// Comma-separated node ids, any level
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
        /// First day of the date range (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day of the date range (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Read hierarchy and records from a JSON snapshot
        #[arg(long, conflicts_with = "sqlite")]
        snapshot: Option<PathBuf>,
        /// Read hierarchy and records from a local `SQLite` database
        #[arg(long)]
        sqlite: Option<PathBuf>,
    },
    /// Score one inspection checklist
    InspectionScore {
        /// Checklist JSON file
        #[arg(long)]
        checklist: PathBuf,
    },
    /// Score complaint handling performance
    ComplaintScore {
        /// Complaints received
        #[arg(long, required_unless_present = "complaints")]
        total: Option<u64>,
        /// Complaints resolved
        #[arg(long, required_unless_present = "complaints")]
        resolved: Option<u64>,
        /// Average resolution time of resolved complaints, in seconds
        #[arg(long, required_unless_present = "complaints")]
        avg_seconds: Option<Decimal>,
        /// JSON array of `{createdAt, resolvedAt}` complaints to count instead
        #[arg(long, conflicts_with_all = ["total", "resolved", "avg_seconds"])]
        complaints: Option<PathBuf>,
    },
    /// Derive fund utilization and per-household cost
    FundMetrics {
        /// Funds sanctioned, in the base currency unit
        #[arg(long)]
        sanctioned: Decimal,
        /// Work order amount, in the base currency unit
        #[arg(long)]
        work_orders: Decimal,
        /// Households served
        #[arg(long)]
        households: u64,
    },
    /// Load a JSON snapshot into a local `SQLite` database
    Import {
        /// Snapshot to load
        #[arg(long)]
        snapshot: PathBuf,
        /// Target database file (created if missing)
        #[arg(long)]
        sqlite: PathBuf,
    },
}

fn backend(snapshot: Option<PathBuf>, sqlite: Option<PathBuf>) -> Backend {
    match (snapshot, sqlite) {
        (Some(path), _) => Backend::Snapshot(path),
        (None, Some(path)) => Backend::Sqlite(path),
        (None, None) => Backend::Postgres,
    }
}

fn complaint_score(
    counts: (Option<u64>, Option<u64>, Option<Decimal>),
    complaints: Option<&Path>,
    rubric: &ScoringRubric,
) -> Result<ComplaintScore, Box<dyn std::error::Error>> {
    if let Some(path) = complaints {
        return Ok(complaints::load(path)?.score(rubric));
    }
    let (Some(total), Some(resolved), Some(avg_seconds)) = counts else {
        return Err("--total, --resolved and --avg-seconds are required".into());
    };
    if resolved > total {
        return Err(format!("resolved ({resolved}) exceeds total ({total})").into());
    }
    Ok(ComplaintScore::compute(total, resolved, avg_seconds, rubric))
}

fn load_rubric(path: Option<&Path>) -> Result<ScoringRubric, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(ScoringRubric::standard().clone());
    };
    let toml = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let rubric = ScoringRubric::from_toml_str(&toml)?;
    log::info!("Using rubric from {}", path.display());
    Ok(rubric)
}

/// Cancels `token` on the first Ctrl-C.
fn cancel_on_interrupt(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling aggregation");
            token.cancel();
        }
    })
}

async fn import(
    snapshot: &Path,
    sqlite: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let Snapshot { nodes, records } = Snapshot::load(snapshot)?;
    InMemoryGeography::new(nodes.clone())?;

    let db = sanitation_database::open_sqlite(sqlite).await?;
    let counts =
        sanitation_database::import::import_snapshot(db.as_ref(), &nodes, &records).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "nodes": counts.nodes,
                "inspections": counts.inspections,
                "surveys": counts.surveys,
                "contractors": counts.contractors,
            })
        );
    } else {
        println!(
            "Imported {} nodes, {} inspections, {} surveys, {} contractors into {}",
            counts.nodes,
            counts.inspections,
            counts.surveys,
            counts.contractors,
            sqlite.display()
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let rubric = load_rubric(cli.rubric.as_deref())?;

    match cli.command {
        Commands::Coverage {
            domain,
            level,
            ids,
            from,
            to,
            snapshot,
            sqlite,
            top,
        } => {
            let request = CoverageRequest {
                domain,
                level,
                ids: ids.into_iter().map(NodeId).collect(),
                from,
                to,
                backend: backend(snapshot, sqlite),
                top,
            };

            let cancel = CancellationToken::new();
            let watcher = cancel_on_interrupt(cancel.clone());
            let result = coverage::run(&request, &rubric, &cancel).await;
            watcher.abort();
            let summary = result?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", report::coverage_table(&summary));
            }
        }
        Commands::SurveySchemes {
            ids,
            from,
            to,
            snapshot,
            sqlite,
        } => {
            let request = SchemeRequest {
                ids: ids.into_iter().map(NodeId).collect(),
                from,
                to,
                backend: backend(snapshot, sqlite),
            };
            let summary = schemes::run(&request).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", report::scheme_table(&summary));
            }
        }
        Commands::InspectionScore { checklist } => {
            let json = std::fs::read_to_string(&checklist)
                .map_err(|e| format!("Failed to read {}: {e}", checklist.display()))?;
            let checklist: InspectionChecklist = serde_json::from_str(&json)?;
            let score = score_inspection(&checklist, &rubric);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&score)?);
            } else {
                println!("{}", report::inspection_table(&score));
            }
        }
        Commands::ComplaintScore {
            total,
            resolved,
            avg_seconds,
            complaints,
        } => {
            let score = complaint_score(
                (total, resolved, avg_seconds),
                complaints.as_deref(),
                &rubric,
            )?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&score)?);
            } else {
                println!("{}", report::complaint_table(&score));
            }
        }
        Commands::FundMetrics {
            sanctioned,
            work_orders,
            households,
        } => {
            let summary = FundSummary::compute(sanctioned, work_orders, households, &rubric);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", report::fund_table(&summary));
            }
        }
        Commands::Import { snapshot, sqlite } => import(&snapshot, &sqlite, cli.json).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn complaint_counts_are_checked() {
        let rubric = ScoringRubric::standard();
        let score =
            complaint_score((Some(100), Some(85), Some(dec!(302400))), None, rubric).unwrap();
        assert_eq!(score.total, dec!(67.50));

        assert!(complaint_score((Some(1), Some(2), Some(dec!(0))), None, rubric).is_err());
        assert!(complaint_score((Some(1), None, None), None, rubric).is_err());
    }

    #[test]
    fn complaint_export_replaces_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("complaints.json");
        std::fs::write(
            &path,
            r#"[{"createdAt": "2025-04-01T00:00:00Z", "resolvedAt": "2025-04-04T12:00:00Z"}]"#,
        )
        .unwrap();

        let score = complaint_score((None, None, None), Some(&path), ScoringRubric::standard())
            .unwrap();
        // Half the SLA and everything resolved.
        assert_eq!(score.resolution_time_score, dec!(25.00));
        assert_eq!(score.resolution_rate_score, dec!(50.00));
    }

    #[test]
    fn cli_parses_the_new_subcommands() {
        let cli = Cli::try_parse_from([
            "sanitation_cli",
            "fund-metrics",
            "--sanctioned",
            "50000000",
            "--work-orders",
            "37500000",
            "--households",
            "1200",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::FundMetrics { households: 1200, .. }));

        let cli =
            Cli::try_parse_from(["sanitation_cli", "complaint-score", "--complaints", "c.json"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Commands::ComplaintScore { total: None, complaints: Some(_), .. }
        ));

        assert!(
            Cli::try_parse_from(["sanitation_cli", "complaint-score", "--total", "3"]).is_err()
        );

        let cli = Cli::try_parse_from([
            "sanitation_cli",
            "coverage",
            "--domain",
            "contractor",
            "--level",
            "district",
            "--ids",
            "10,11",
            "--top",
            "1",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Coverage { top: Some(1), .. }));
    }
}
