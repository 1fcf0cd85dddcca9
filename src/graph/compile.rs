//! Graph validation and layering.
//!
//! Compilation turns a [`GraphBuilder`] into an [`ExecutionPlan`] using
//! Kahn's algorithm: a node's layer is `1 + max(layer of predecessors)`,
//! layer 0 when it has none. Ties inside a layer are broken
//! lexicographically so compilation is fully deterministic for a given
//! node/edge set; layer ordering matters only for reproducible logs, the
//! engine still runs a layer's nodes in parallel.

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;

use super::{join_ids, plan::ExecutionPlan, GraphBuilder};
use crate::types::NodeId;

/// Structural errors detected at compile time.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// One or more predecessors reference ids that were never defined.
    #[error("undefined predecessors: {}", join_ids(.missing))]
    #[diagnostic(
        code(rubriq::graph::undefined_predecessors),
        help("Every id named as a predecessor must also be defined with its own `define` call.")
    )]
    UndefinedPredecessors { missing: Vec<NodeId> },

    /// The dependency graph contains at least one cycle.
    #[error("dependency cycle involving nodes: {}", join_ids(.members))]
    #[diagnostic(
        code(rubriq::graph::cycle),
        help("Remove one of the listed dependencies to break the cycle.")
    )]
    Cycle { members: Vec<NodeId> },

    /// The builder holds no nodes at all.
    #[error("graph has no nodes")]
    #[diagnostic(code(rubriq::graph::empty))]
    Empty,
}

impl GraphBuilder {
    /// Validate the graph and compute its layered execution plan.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Empty`] when nothing was defined.
    /// - [`GraphError::UndefinedPredecessors`] listing every missing id.
    /// - [`GraphError::Cycle`] naming every node on a cycle.
    pub fn compile(self) -> Result<ExecutionPlan, GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::Empty);
        }

        let mut missing: Vec<NodeId> = self
            .nodes
            .values()
            .flatten()
            .filter(|dep| !self.nodes.contains_key(dep))
            .cloned()
            .collect();
        if !missing.is_empty() {
            missing.sort();
            missing.dedup();
            return Err(GraphError::UndefinedPredecessors { missing });
        }

        let layers = layer_nodes(&self.nodes)?;
        Ok(ExecutionPlan::new(layers, self.nodes))
    }
}

/// Kahn's algorithm over predecessor lists, producing layers instead of a
/// flat ordering. Nodes left unresolved when the frontier empties are cycle
/// members.
fn layer_nodes(
    nodes: &FxHashMap<NodeId, Vec<NodeId>>,
) -> Result<Vec<Vec<NodeId>>, GraphError> {
    let mut in_degree: FxHashMap<&NodeId, usize> = nodes
        .iter()
        .map(|(id, deps)| (id, deps.len()))
        .collect();
    let mut dependents: FxHashMap<&NodeId, Vec<&NodeId>> = FxHashMap::default();
    for (id, deps) in nodes {
        for dep in deps {
            dependents.entry(dep).or_default().push(id);
        }
    }

    let mut frontier: Vec<&NodeId> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(id, _)| *id)
        .collect();
    frontier.sort();

    let mut layers: Vec<Vec<NodeId>> = Vec::new();
    let mut resolved = 0usize;

    while !frontier.is_empty() {
        resolved += frontier.len();
        let mut next: Vec<&NodeId> = Vec::new();
        for id in &frontier {
            if let Some(children) = dependents.get(*id) {
                for child in children {
                    if let Some(deg) = in_degree.get_mut(*child) {
                        *deg = deg.saturating_sub(1);
                        if *deg == 0 {
                            next.push(*child);
                        }
                    }
                }
            }
        }
        next.sort();
        layers.push(frontier.iter().map(|id| (*id).clone()).collect());
        frontier = next;
    }

    if resolved < nodes.len() {
        let mut members: Vec<NodeId> = in_degree
            .iter()
            .filter(|(_, deg)| **deg > 0)
            .map(|(id, _)| (*id).clone())
            .collect();
        members.sort();
        return Err(GraphError::Cycle { members });
    }

    Ok(layers)
}
