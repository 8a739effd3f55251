//! The `coverage` subcommand: one aggregation over a snapshot or database.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::ValueEnum;
use sanitation_aggregation::{
    AggregateOutcome, Aggregator, AggregatorConfig, CancellationToken, CoverageResult,
};
use sanitation_database::DbStore;
use sanitation_formula::fund::to_crores;
use sanitation_formula::{RankedPerformance, ScoringRubric, rank_by_performance};
use sanitation_geography::GeographyTree;
use sanitation_geography_models::{DateRange, Level, NodeId};
use sanitation_metrics::{
    ContractorProvider, ContractorSource, InspectionProvider, InspectionSource, MetricProvider,
    SurveyProvider, SurveySource,
};
use serde::Serialize;

use crate::snapshot::Snapshot;

/// Which leaf metric to roll up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Domain {
    Inspection,
    Survey,
    Contractor,
}

/// Where the hierarchy and records come from.
#[derive(Debug, Clone)]
pub enum Backend {
    Snapshot(PathBuf),
    Sqlite(PathBuf),
    Postgres,
}

/// Parsed arguments of one coverage run.
#[derive(Debug, Clone)]
pub struct CoverageRequest {
    pub domain: Domain,
    pub level: Level,
    pub ids: Vec<NodeId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub backend: Backend,
    /// Rank the results and keep this many.
    pub top: Option<usize>,
}

/// Rolled-up results as printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub domain: Domain,
    pub level: Level,
    pub range: DateRange,
    pub results: Vec<CoverageResult>,
    pub not_found: Vec<NodeId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ranking: Vec<RankedPerformance<NodeId>>,
}

impl Domain {
    /// The figure a node is judged by: contract totals for contractors,
    /// the rolled-up average otherwise.
    #[must_use]
    pub const fn headline(self, result: &CoverageResult) -> rust_decimal::Decimal {
        match self {
            Self::Contractor => result.total_score,
            Self::Inspection | Self::Survey => result.average_score,
        }
    }
}

fn provider_for<S>(
    domain: Domain,
    source: Arc<S>,
    rubric: &ScoringRubric,
) -> Box<dyn MetricProvider>
where
    S: InspectionSource + SurveySource + ContractorSource + 'static,
{
    match domain {
        Domain::Inspection => Box::new(InspectionProvider::with_rubric(source, rubric.clone())),
        Domain::Survey => Box::new(SurveyProvider::new(source)),
        Domain::Contractor => Box::new(ContractorProvider::new(source)),
    }
}

/// Runs the aggregation described by `request`.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened, the request is
/// invalid, a read fails, or `cancel` fires.
pub async fn run(
    request: &CoverageRequest,
    rubric: &ScoringRubric,
    cancel: &CancellationToken,
) -> Result<CoverageReport, Box<dyn std::error::Error>> {
    let range = DateRange::new(request.from, request.to)?;
    let config = AggregatorConfig::from_env()?;

    let (tree, provider) = match &request.backend {
        Backend::Snapshot(path) => {
            let (tree, records) = Snapshot::load(path)?.into_parts()?;
            let tree: Arc<dyn GeographyTree> = Arc::new(tree);
            (tree, provider_for(request.domain, Arc::new(records), rubric))
        }
        Backend::Sqlite(path) => {
            let store = Arc::new(DbStore::new(sanitation_database::open_sqlite(path).await?));
            let tree: Arc<dyn GeographyTree> = store.clone();
            (tree, provider_for(request.domain, store, rubric))
        }
        Backend::Postgres => {
            let store = Arc::new(DbStore::new(sanitation_database::connect_from_env().await?));
            let tree: Arc<dyn GeographyTree> = store.clone();
            (tree, provider_for(request.domain, store, rubric))
        }
    };

    let aggregator = Aggregator::new(tree, config)?;
    let outcome = aggregator
        .aggregate_cancellable(
            &request.ids,
            request.level,
            provider.as_ref(),
            &range,
            cancel,
        )
        .await?;

    Ok(present(request, range, outcome, rubric))
}

/// Orders results as requested. Contractor totals are converted to Crores
/// here, after aggregation; averages stay in the stored unit.
fn present(
    request: &CoverageRequest,
    range: DateRange,
    mut outcome: AggregateOutcome,
    rubric: &ScoringRubric,
) -> CoverageReport {
    let mut results = Vec::with_capacity(outcome.results.len());
    let mut not_found = Vec::new();

    for id in &request.ids {
        if let Some(mut result) = outcome.results.remove(id) {
            if request.domain == Domain::Contractor {
                result.total_score = to_crores(result.total_score, rubric);
            }
            results.push(result);
        } else if outcome.failures.remove(id).is_some() {
            not_found.push(*id);
        }
    }

    let ranking = request.top.map_or_else(Vec::new, |n| {
        rank_by_performance(
            results
                .iter()
                .map(|r| (r.node_id, request.domain.headline(r))),
            n,
        )
    });

    CoverageReport {
        domain: request.domain,
        level: request.level,
        range,
        results,
        not_found,
        ranking,
    }
}
