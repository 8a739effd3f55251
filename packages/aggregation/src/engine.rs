//! The tree aggregator.
//!
//! A call walks down from the requested nodes one level at a time, reading
//! all children of the current frontier in chunked, bounded-concurrency
//! batches. Villages are then scored in one provider pass and folded back up
//! through the recorded parent links. Levels are strictly sequential; reads
//! within a level run in parallel.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;

use futures::{StreamExt as _, TryStreamExt as _};
use sanitation_aggregation_models::{AggregateOutcome, CoverageResult, NodeError};
use sanitation_geography::{GeoError, GeographyTree};
use sanitation_geography_models::{DateRange, Level, NodeId};
use sanitation_metrics::MetricProvider;
use sanitation_metrics_models::LeafMetric;
use tokio_util::sync::CancellationToken;

use crate::fold::{ParentFold, Rollup};
use crate::{AggregationError, AggregatorConfig};

/// One level transition: the nodes reached and their parents.
struct Tier {
    level: Level,
    nodes: Vec<NodeId>,
    parent_of: BTreeMap<NodeId, NodeId>,
}

/// Rolls leaf metrics up the administrative tree.
///
/// Holds no per-call state; one instance can serve concurrent calls.
#[derive(Clone)]
pub struct Aggregator {
    tree: Arc<dyn GeographyTree>,
    config: AggregatorConfig,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Aggregator {
    /// Creates an aggregator reading the hierarchy from `tree`.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::Validation`] if `config` is invalid.
    pub fn new(
        tree: Arc<dyn GeographyTree>,
        config: AggregatorConfig,
    ) -> Result<Self, AggregationError> {
        config.validate()?;
        Ok(Self { tree, config })
    }

    /// Tuning in effect.
    #[must_use]
    pub const fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Aggregates every node in `ids`, all of which must be at `level`.
    ///
    /// Duplicate ids are answered once. Unknown ids are reported in
    /// [`AggregateOutcome::failures`] without affecting the rest of the
    /// batch. An empty `ids` yields an empty outcome.
    ///
    /// # Errors
    ///
    /// * [`AggregationError::Validation`] if `range` is inverted or a known
    ///   id is not at `level`
    /// * [`AggregationError::Geography`] / [`AggregationError::Provider`] if
    ///   a read fails; no partial results are returned
    pub async fn aggregate(
        &self,
        ids: &[NodeId],
        level: Level,
        provider: &dyn MetricProvider,
        range: &DateRange,
    ) -> Result<AggregateOutcome, AggregationError> {
        self.aggregate_cancellable(ids, level, provider, range, &CancellationToken::new())
            .await
    }

    /// [`Aggregator::aggregate`] observing `cancel`.
    ///
    /// The token is checked between level transitions and raced against
    /// every in-flight read.
    ///
    /// # Errors
    ///
    /// As [`Aggregator::aggregate`], plus [`AggregationError::Cancelled`]
    /// once `cancel` fires. Nothing computed before cancellation is returned.
    pub async fn aggregate_cancellable(
        &self,
        ids: &[NodeId],
        level: Level,
        provider: &dyn MetricProvider,
        range: &DateRange,
        cancel: &CancellationToken,
    ) -> Result<AggregateOutcome, AggregationError> {
        range
            .validate()
            .map_err(|e| AggregationError::Validation {
                message: e.to_string(),
            })?;

        if ids.is_empty() {
            return Ok(AggregateOutcome::default());
        }
        ensure_live(cancel)?;

        let requested: BTreeSet<NodeId> = ids.iter().copied().collect();
        let requested: Vec<NodeId> = requested.into_iter().collect();
        let roots = self.resolve_roots(&requested, level, cancel).await?;

        let failures: BTreeMap<NodeId, NodeError> = requested
            .iter()
            .filter(|id| roots.binary_search(id).is_err())
            .map(|&id| {
                log::warn!("aggregate: {level} {id} not found");
                (id, NodeError::NotFound { id })
            })
            .collect();

        let tiers = self.descend(&roots, level, cancel).await?;

        let leaves = tiers.last().map_or(&roots, |tier| &tier.nodes);
        ensure_live(cancel)?;
        let metrics = self.fetch_metrics(leaves, provider, range, cancel).await?;

        let mut rollups: BTreeMap<NodeId, Rollup> = leaves
            .iter()
            .map(|id| {
                let metric = metrics.get(id).cloned().unwrap_or_else(LeafMetric::absent);
                (*id, Rollup::leaf(&metric))
            })
            .collect();

        for (depth, tier) in tiers.iter().enumerate().rev() {
            let parents = if depth == 0 {
                &roots
            } else {
                &tiers[depth - 1].nodes
            };
            rollups = fold_tier(parents, tier, &rollups);
        }

        let results: BTreeMap<NodeId, CoverageResult> = rollups
            .into_iter()
            .map(|(id, rollup)| (id, rollup.finish(id, level)))
            .collect();

        log::info!(
            "aggregate: {} {level} nodes via {} provider, {} villages, {} not found",
            results.len(),
            provider.name(),
            leaves.len(),
            failures.len()
        );

        Ok(AggregateOutcome { results, failures })
    }

    /// Aggregates a single node through the batch path.
    ///
    /// # Errors
    ///
    /// As [`Aggregator::aggregate`], plus [`AggregationError::NotFound`] if
    /// `id` is unknown.
    pub async fn aggregate_one(
        &self,
        id: NodeId,
        level: Level,
        provider: &dyn MetricProvider,
        range: &DateRange,
    ) -> Result<CoverageResult, AggregationError> {
        self.aggregate_one_cancellable(id, level, provider, range, &CancellationToken::new())
            .await
    }

    /// [`Aggregator::aggregate_one`] observing `cancel`.
    ///
    /// # Errors
    ///
    /// As [`Aggregator::aggregate_one`], plus
    /// [`AggregationError::Cancelled`].
    pub async fn aggregate_one_cancellable(
        &self,
        id: NodeId,
        level: Level,
        provider: &dyn MetricProvider,
        range: &DateRange,
        cancel: &CancellationToken,
    ) -> Result<CoverageResult, AggregationError> {
        let mut outcome = self
            .aggregate_cancellable(&[id], level, provider, range, cancel)
            .await?;
        outcome
            .results
            .remove(&id)
            .ok_or(AggregationError::NotFound { id })
    }

    /// Looks up the requested ids and checks they sit at `level`. Returns
    /// the ids that exist, sorted.
    async fn resolve_roots(
        &self,
        requested: &[NodeId],
        level: Level,
        cancel: &CancellationToken,
    ) -> Result<Vec<NodeId>, AggregationError> {
        let tree = self.tree.as_ref();
        let found = self
            .fetch_chunked(requested, cancel, |chunk| async move {
                tree.nodes(&chunk).await
            })
            .await?;

        let mut roots = Vec::new();
        for node in found.into_iter().flatten() {
            if node.level != level {
                return Err(AggregationError::Validation {
                    message: format!(
                        "node {} is a {}, but the batch is at level {level}",
                        node.id, node.level
                    ),
                });
            }
            roots.push(node.id);
        }
        roots.sort_unstable();
        roots.dedup();
        Ok(roots)
    }

    /// Walks from `roots` down to the villages, one read per level.
    async fn descend(
        &self,
        roots: &[NodeId],
        level: Level,
        cancel: &CancellationToken,
    ) -> Result<Vec<Tier>, AggregationError> {
        let tree = self.tree.as_ref();
        let mut tiers: Vec<Tier> = Vec::new();

        for child_level in level.descendants() {
            ensure_live(cancel)?;

            let frontier = tiers.last().map_or(roots, |tier| tier.nodes.as_slice());
            let batches = self
                .fetch_chunked(frontier, cancel, |chunk| async move {
                    tree.children_of(&chunk, child_level).await
                })
                .await?;

            let mut parent_of = BTreeMap::new();
            for child in batches.into_iter().flatten() {
                let Some(parent) = child.parent_id else {
                    return Err(GeoError::InvalidTree {
                        message: format!("{} {} has no parent", child.level, child.id),
                    }
                    .into());
                };
                parent_of.insert(child.id, parent);
            }

            let nodes: Vec<NodeId> = parent_of.keys().copied().collect();
            log::debug!(
                "descend: {} {child_level} nodes under {} parents",
                nodes.len(),
                frontier.len()
            );

            tiers.push(Tier {
                level: child_level,
                nodes,
                parent_of,
            });
        }

        Ok(tiers)
    }

    /// Reads leaf metrics for `leaves` in chunks.
    async fn fetch_metrics(
        &self,
        leaves: &[NodeId],
        provider: &dyn MetricProvider,
        range: &DateRange,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<NodeId, LeafMetric>, AggregationError> {
        let batches = self
            .fetch_chunked(leaves, cancel, |chunk| async move {
                provider.fetch(&chunk, range).await
            })
            .await?;

        let metrics: BTreeMap<NodeId, LeafMetric> = batches.into_iter().flatten().collect();
        log::debug!(
            "fetch_metrics: {} provider returned {} of {} villages",
            provider.name(),
            metrics.len(),
            leaves.len()
        );
        Ok(metrics)
    }

    /// Runs `fetch` over `ids` split into chunks, at most
    /// `max_concurrency` at a time, abandoning everything if `cancel` fires.
    /// Returns one output per chunk in completion order.
    async fn fetch_chunked<T, E, F, Fut>(
        &self,
        ids: &[NodeId],
        cancel: &CancellationToken,
        fetch: F,
    ) -> Result<Vec<T>, AggregationError>
    where
        F: Fn(Vec<NodeId>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        AggregationError: From<E>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let chunks: Vec<Vec<NodeId>> = ids
            .chunks(self.config.chunk_size)
            .map(<[NodeId]>::to_vec)
            .collect();

        let reads = futures::stream::iter(chunks)
            .map(fetch)
            .buffer_unordered(self.config.max_concurrency)
            .try_collect::<Vec<T>>();

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AggregationError::Cancelled),
            result = reads => result.map_err(AggregationError::from),
        }
    }
}

/// Folds the rollups of `tier` into their parents. Every parent gets a
/// result, including parents without children.
fn fold_tier(
    parents: &[NodeId],
    tier: &Tier,
    children: &BTreeMap<NodeId, Rollup>,
) -> BTreeMap<NodeId, Rollup> {
    let mut folds: BTreeMap<NodeId, ParentFold> = parents
        .iter()
        .map(|id| (*id, ParentFold::default()))
        .collect();

    for (child, rollup) in children {
        let Some(parent) = tier.parent_of.get(child) else {
            continue;
        };
        let Some(fold) = folds.get_mut(parent) else {
            log::warn!(
                "fold: {} {child} points at parent {parent} outside the frontier",
                tier.level
            );
            continue;
        };
        fold.push(rollup);
    }

    folds
        .into_iter()
        .map(|(id, fold)| (id, fold.finish()))
        .collect()
}

fn ensure_live(cancel: &CancellationToken) -> Result<(), AggregationError> {
    if cancel.is_cancelled() {
        return Err(AggregationError::Cancelled);
    }
    Ok(())
}
