use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::node::TaskNode;
use crate::types::NodeId;

/// Maps node ids to their executable implementations.
///
/// The registry is assembled once and shared read-only across jobs; a graph
/// submitted against it must only reference ids that are bound here.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    nodes: FxHashMap<NodeId, Arc<dyn TaskNode>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an implementation to an id. Re-binding an id replaces the
    /// previous implementation.
    #[must_use]
    pub fn bind(mut self, id: impl Into<NodeId>, node: Arc<dyn TaskNode>) -> Self {
        self.nodes.insert(id.into(), node);
        self
    }

    pub fn get(&self, id: &NodeId) -> Option<Arc<dyn TaskNode>> {
        self.nodes.get(id).cloned()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&NodeId> = self.nodes.keys().collect();
        ids.sort();
        f.debug_struct("NodeRegistry").field("nodes", &ids).finish()
    }
}
