//! Compiled execution plans.

use rustc_hash::FxHashMap;

use crate::types::NodeId;

/// A validated, layered execution plan.
///
/// Produced by [`GraphBuilder::compile`](super::GraphBuilder::compile).
/// Layers run in index order; all nodes in one layer are eligible to run
/// concurrently. The plan is immutable once built.
#[derive(Clone, Debug)]
pub struct ExecutionPlan {
    layers: Vec<Vec<NodeId>>,
    dependencies: FxHashMap<NodeId, Vec<NodeId>>,
}

impl ExecutionPlan {
    pub(super) fn new(
        layers: Vec<Vec<NodeId>>,
        dependencies: FxHashMap<NodeId, Vec<NodeId>>,
    ) -> Self {
        Self {
            layers,
            dependencies,
        }
    }

    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Nodes in the given layer, sorted lexicographically.
    ///
    /// # Panics
    ///
    /// Panics when `index >= layer_count()`.
    #[must_use]
    pub fn layer(&self, index: usize) -> &[NodeId] {
        &self.layers[index]
    }

    /// All layers in execution order.
    #[must_use]
    pub fn layers(&self) -> &[Vec<NodeId>] {
        &self.layers
    }

    /// Total number of nodes across all layers.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Direct predecessors of a node; empty for roots and unknown ids.
    #[must_use]
    pub fn predecessors(&self, id: &NodeId) -> &[NodeId] {
        self.dependencies
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.dependencies.contains_key(id)
    }

    /// Iterate all node ids in layer order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.layers.iter().flatten()
    }
}
