//! Dependency-graph definition and compilation.
//!
//! A graph is declared through [`GraphBuilder`] as a set of node ids and
//! their predecessors, then compiled into a layered [`ExecutionPlan`].
//! Compilation validates that every referenced predecessor exists and that
//! the graph is acyclic; both checks report every offending node id, not
//! just the first.
//!
//! # Examples
//!
//! ```
//! use rubriq::graph::GraphBuilder;
//!
//! let plan = GraphBuilder::new()
//!     .define("parse", Vec::<&str>::new())
//!     .define("lint", ["parse"])
//!     .define("score", ["parse"])
//!     .define("report", ["lint", "score"])
//!     .compile()
//!     .unwrap();
//!
//! assert_eq!(plan.layer_count(), 3);
//! assert_eq!(plan.layer(1), ["lint".into(), "score".into()]);
//! ```

mod builder;
mod compile;
mod plan;

pub use builder::GraphBuilder;
pub use compile::GraphError;
pub use plan::ExecutionPlan;

use crate::types::NodeId;

pub(crate) fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
