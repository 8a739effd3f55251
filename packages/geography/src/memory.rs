//! In-memory hierarchy used for snapshots and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sanitation_geography_models::{GeographyNode, Level, NodeId};

use crate::{GeoError, GeographyTree};

/// A fully loaded, validated administrative tree.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGeography {
    nodes: BTreeMap<NodeId, GeographyNode>,
    children: BTreeMap<NodeId, Vec<NodeId>>,
}

impl InMemoryGeography {
    /// Builds the tree, checking that ids are unique, that only states lack
    /// a parent, and that every parent exists one level up.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidTree`] naming the first offending node.
    pub fn new(nodes: impl IntoIterator<Item = GeographyNode>) -> Result<Self, GeoError> {
        let mut by_id = BTreeMap::new();
        for node in nodes {
            let id = node.id;
            if by_id.insert(id, node).is_some() {
                return Err(GeoError::InvalidTree {
                    message: format!("duplicate node id {id}"),
                });
            }
        }

        let mut children: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for node in by_id.values() {
            match (node.level.parent(), node.parent_id) {
                (None, None) => {}
                (None, Some(parent)) => {
                    return Err(GeoError::InvalidTree {
                        message: format!("state {} has parent {parent}", node.id),
                    });
                }
                (Some(_), None) => {
                    return Err(GeoError::InvalidTree {
                        message: format!("{} {} has no parent", node.level, node.id),
                    });
                }
                (Some(expected), Some(parent_id)) => {
                    let Some(parent) = by_id.get(&parent_id) else {
                        return Err(GeoError::InvalidTree {
                            message: format!(
                                "{} {} references missing parent {parent_id}",
                                node.level, node.id
                            ),
                        });
                    };
                    if parent.level != expected {
                        return Err(GeoError::InvalidTree {
                            message: format!(
                                "{} {} has parent {parent_id} at level {}, expected {expected}",
                                node.level, node.id, parent.level
                            ),
                        });
                    }
                    children.entry(parent_id).or_default().push(node.id);
                }
            }
        }

        log::debug!(
            "Loaded in-memory geography: {} nodes, {} parents",
            by_id.len(),
            children.len()
        );

        Ok(Self {
            nodes: by_id,
            children,
        })
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a single node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&GeographyNode> {
        self.nodes.get(&id)
    }

    /// All nodes at `level`, ordered by id.
    #[must_use]
    pub fn at_level(&self, level: Level) -> Vec<&GeographyNode> {
        self.nodes.values().filter(|n| n.level == level).collect()
    }
}

#[async_trait]
impl GeographyTree for InMemoryGeography {
    async fn nodes(&self, ids: &[NodeId]) -> Result<Vec<GeographyNode>, GeoError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .cloned()
            .collect())
    }

    async fn children_of(
        &self,
        parent_ids: &[NodeId],
        child_level: Level,
    ) -> Result<Vec<GeographyNode>, GeoError> {
        Ok(parent_ids
            .iter()
            .filter_map(|parent| self.children.get(parent))
            .flatten()
            .filter_map(|id| self.nodes.get(id))
            .filter(|child| child.level == child_level)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, level: Level, parent: Option<i64>) -> GeographyNode {
        GeographyNode {
            id: NodeId(id),
            level,
            parent_id: parent.map(NodeId),
            name: format!("{level} {id}"),
        }
    }

    fn sample() -> InMemoryGeography {
        InMemoryGeography::new([
            node(1, Level::State, None),
            node(10, Level::District, Some(1)),
            node(100, Level::Block, Some(10)),
            node(101, Level::Block, Some(10)),
            node(1000, Level::Village, Some(100)),
            node(1001, Level::Village, Some(100)),
            node(1002, Level::Village, Some(101)),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_parent_at_wrong_level() {
        let err = InMemoryGeography::new([
            node(1, Level::State, None),
            node(10, Level::District, Some(1)),
            node(1000, Level::Village, Some(10)),
        ])
        .unwrap_err();
        assert!(matches!(err, GeoError::InvalidTree { .. }), "{err}");
    }

    #[test]
    fn rejects_duplicates_and_orphans() {
        assert!(
            InMemoryGeography::new([node(1, Level::State, None), node(1, Level::State, None)])
                .is_err()
        );
        assert!(InMemoryGeography::new([node(10, Level::District, None)]).is_err());
        assert!(InMemoryGeography::new([node(10, Level::District, Some(99))]).is_err());
    }

    #[tokio::test]
    async fn children_of_batches_parents() {
        let tree = sample();
        let villages = tree
            .children_of(&[NodeId(100), NodeId(101), NodeId(999)], Level::Village)
            .await
            .unwrap();
        let ids: Vec<i64> = villages.iter().map(|n| n.id.value()).collect();
        assert_eq!(ids, vec![1000, 1001, 1002]);
    }

    #[tokio::test]
    async fn all_leaves_under_walks_every_level() {
        let tree = sample();
        let leaves = tree.all_leaves_under(NodeId(1)).await.unwrap();
        assert_eq!(leaves, vec![NodeId(1000), NodeId(1001), NodeId(1002)]);

        let leaves = tree.all_leaves_under(NodeId(101)).await.unwrap();
        assert_eq!(leaves, vec![NodeId(1002)]);

        let leaves = tree.all_leaves_under(NodeId(1001)).await.unwrap();
        assert_eq!(leaves, vec![NodeId(1001)]);

        assert!(tree.all_leaves_under(NodeId(5)).await.unwrap().is_empty());
    }
}
