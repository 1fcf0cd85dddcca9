//! Shared job state and snapshots.
//!
//! Every job owns one [`GlobalState`]. Nodes never touch it directly: they
//! receive an immutable [`StateSnapshot`] and return a
//! [`NodeResult`](crate::node::NodeResult) delta that the reducer registry
//! folds in the moment the node completes.
//!
//! # Fields
//!
//! - **input**: the job's submission payload; read-only, no reducer
//! - **techniques**: sorted, de-duplicated technique labels
//! - **diagnostics**: per-producer diagnostic map (last write wins per key)
//! - **scores**: per-item score candidates, kept in canonical producer order
//! - **errors**: accumulated [`ErrorEntry`] records
//!
//! # Examples
//!
//! ```rust
//! use rubriq::state::GlobalState;
//! use serde_json::json;
//!
//! let state = GlobalState::builder()
//!     .with_input(json!({"document": "fn main() {}"}))
//!     .with_technique("static-analysis")
//!     .build();
//!
//! let snapshot = state.snapshot();
//! assert_eq!(snapshot.techniques, vec!["static-analysis".to_string()]);
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ErrorEntry;
use crate::scoring::ItemScore;

/// The shared state container for one job.
///
/// All mutation goes through the reducer registry; see
/// [`crate::reducers::ReducerRegistry`]. The struct is deliberately explicit:
/// one field per channel of data, one reducer per field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    /// Submission payload. Immutable for the lifetime of the job.
    pub input: Value,
    /// Technique labels reported by analysis nodes, kept sorted and unique.
    pub techniques: Vec<String>,
    /// Per-producer diagnostics, shallow-merged.
    pub diagnostics: FxHashMap<String, Value>,
    /// Score candidates keyed by rubric item id.
    pub scores: FxHashMap<String, Vec<ItemScore>>,
    /// Accumulated non-fatal errors.
    pub errors: Vec<ErrorEntry>,
}

/// Immutable view of job state handed to nodes at dispatch time.
///
/// Snapshots are plain clones: a node reads the state as it existed when the
/// node was dispatched, never a view that mutates underneath it.
#[derive(Clone, Debug, Default)]
pub struct StateSnapshot {
    pub input: Value,
    pub techniques: Vec<String>,
    pub diagnostics: FxHashMap<String, Value>,
    pub scores: FxHashMap<String, Vec<ItemScore>>,
    pub errors: Vec<ErrorEntry>,
}

impl GlobalState {
    /// Create a state seeded with the job's input payload.
    pub fn new_with_input(input: Value) -> Self {
        Self {
            input,
            ..Default::default()
        }
    }

    /// Fluent builder for seeded states, mostly useful in tests and
    /// embeddings that pre-populate diagnostics.
    pub fn builder() -> GlobalStateBuilder {
        GlobalStateBuilder::default()
    }

    /// Clone out an immutable snapshot of the current state.
    ///
    /// O(n) in the amount of data held; called once per node dispatch.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            input: self.input.clone(),
            techniques: self.techniques.clone(),
            diagnostics: self.diagnostics.clone(),
            scores: self.scores.clone(),
            errors: self.errors.clone(),
        }
    }
}

/// Builder for constructing [`GlobalState`] with a fluent API.
///
/// # Examples
///
/// ```rust
/// use rubriq::state::GlobalState;
/// use serde_json::json;
///
/// let state = GlobalState::builder()
///     .with_input(json!({"source": "..."}))
///     .with_diagnostic("lint", json!({"warnings": 2}))
///     .build();
/// assert_eq!(state.diagnostics.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct GlobalStateBuilder {
    input: Value,
    techniques: Vec<String>,
    diagnostics: FxHashMap<String, Value>,
}

impl GlobalStateBuilder {
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    pub fn with_technique(mut self, technique: impl Into<String>) -> Self {
        self.techniques.push(technique.into());
        self
    }

    pub fn with_diagnostic(mut self, key: impl Into<String>, value: Value) -> Self {
        self.diagnostics.insert(key.into(), value);
        self
    }

    pub fn build(mut self) -> GlobalState {
        self.techniques.sort();
        self.techniques.dedup();
        GlobalState {
            input: self.input,
            techniques: self.techniques,
            diagnostics: self.diagnostics,
            scores: FxHashMap::default(),
            errors: Vec::new(),
        }
    }
}
