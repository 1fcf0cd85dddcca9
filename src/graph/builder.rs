//! Fluent builder for dependency graphs.

use rustc_hash::FxHashMap;

use crate::types::NodeId;

/// Builder for declaring a dependency graph node by node.
///
/// Each [`define`](Self::define) call registers a node id together with the
/// ids it depends on. Redefining an id replaces its predecessor list; the
/// last definition wins. Validation is deferred to
/// [`compile`](Self::compile), which checks the whole graph at once so every
/// problem is reported together.
///
/// # Examples
///
/// ## Linear chain
/// ```
/// use rubriq::graph::GraphBuilder;
///
/// let plan = GraphBuilder::new()
///     .define("extract", Vec::<&str>::new())
///     .define("analyze", ["extract"])
///     .define("report", ["analyze"])
///     .compile()
///     .unwrap();
/// assert_eq!(plan.layer_count(), 3);
/// ```
///
/// ## Diamond fan-out / fan-in
/// ```
/// use rubriq::graph::GraphBuilder;
///
/// let plan = GraphBuilder::new()
///     .define("root", Vec::<&str>::new())
///     .define("left", ["root"])
///     .define("right", ["root"])
///     .define("join", ["left", "right"])
///     .compile()
///     .unwrap();
/// assert_eq!(plan.layer(1), ["left".into(), "right".into()]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    /// Predecessor lists keyed by node id.
    pub(super) nodes: FxHashMap<NodeId, Vec<NodeId>>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node and the predecessors it depends on.
    ///
    /// Duplicate predecessor entries are collapsed; a self-dependency is kept
    /// and later rejected by compilation as a one-node cycle.
    #[must_use]
    pub fn define<I, P>(mut self, id: impl Into<NodeId>, predecessors: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<NodeId>,
    {
        let mut deps: Vec<NodeId> = predecessors.into_iter().map(Into::into).collect();
        deps.sort();
        deps.dedup();
        self.nodes.insert(id.into(), deps);
        self
    }

    /// Number of nodes defined so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the given id has been defined.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Iterate over defined node ids in unspecified order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }
}
