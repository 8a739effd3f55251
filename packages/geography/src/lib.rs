#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read access to the state → district → block → village hierarchy.
//!
//! The aggregation engine never caches the tree: every request reads it
//! fresh through [`GeographyTree`]. Reads are batched per level transition
//! (all children of a set of parents in one call) so a state-wide rollup
//! issues a handful of queries instead of one per node.

pub mod memory;

use async_trait::async_trait;
use sanitation_geography_models::{GeographyNode, Level, NodeId};
use thiserror::Error;

pub use memory::InMemoryGeography;

/// Errors that can occur while reading the hierarchy.
#[derive(Debug, Error)]
pub enum GeoError {
    /// The backing store failed.
    #[error("Geography source error: {message}")]
    Source {
        /// Description of what went wrong.
        message: String,
    },

    /// The node set does not form a valid four-level tree.
    #[error("Invalid geography tree: {message}")]
    InvalidTree {
        /// Description of the violated invariant.
        message: String,
    },
}

/// Read interface over the administrative tree.
///
/// Implementations must return a consistent snapshot for the duration of a
/// call; no mutation happens while an aggregation is running.
#[async_trait]
pub trait GeographyTree: Send + Sync {
    /// Looks up nodes by id. Unknown ids are absent from the result, they are
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the backing store fails.
    async fn nodes(&self, ids: &[NodeId]) -> Result<Vec<GeographyNode>, GeoError>;

    /// Returns every node at `child_level` whose parent is in `parent_ids`.
    ///
    /// This is the batched `ChildrenOf` read: one call covers all parents of
    /// a level transition.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the backing store fails.
    async fn children_of(
        &self,
        parent_ids: &[NodeId],
        child_level: Level,
    ) -> Result<Vec<GeographyNode>, GeoError>;

    /// Returns the ids of all villages under `id` (the village itself when
    /// `id` is a village, empty when `id` is unknown).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the backing store fails.
    async fn all_leaves_under(&self, id: NodeId) -> Result<Vec<NodeId>, GeoError> {
        let Some(node) = self.nodes(&[id]).await?.into_iter().next() else {
            return Ok(Vec::new());
        };

        let mut frontier = vec![node.id];
        for level in node.level.descendants() {
            if frontier.is_empty() {
                break;
            }
            frontier = self
                .children_of(&frontier, level)
                .await?
                .into_iter()
                .map(|child| child.id)
                .collect();
        }

        frontier.sort_unstable();
        Ok(frontier)
    }
}
