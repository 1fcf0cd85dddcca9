mod append_errors;
mod append_techniques;
mod merge_diagnostics;
mod merge_scores;
mod registry;

pub use append_errors::AppendErrors;
pub use append_techniques::AppendTechniques;
pub use merge_diagnostics::MergeDiagnostics;
pub use merge_scores::MergeScores;
pub use registry::ReducerRegistry;

use crate::node::NodeResult;
use crate::state::GlobalState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified reducer trait: every reducer folds one channel of a [`NodeResult`]
/// delta into [`GlobalState`].
///
/// Reducers must be associative and commutative over deltas: merging any
/// permutation of a fixed set of results yields byte-identical state. That
/// property is what lets nodes in a layer complete in any order.
pub trait Reducer: Send + Sync {
    fn apply(&self, state: &mut GlobalState, update: &NodeResult);
}

/// The mutable fields of [`GlobalState`], each owned by one reducer.
///
/// The job input is deliberately absent: it is immutable and has no reducer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    Techniques,
    Diagnostics,
    Scores,
    Errors,
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Techniques => "techniques",
            Self::Diagnostics => "diagnostics",
            Self::Scores => "scores",
            Self::Errors => "errors",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ReducerError {
    #[error("no reducer registered for field: {0}")]
    #[diagnostic(
        code(rubriq::reducers::unknown_field),
        help("Register a reducer for every field before applying updates.")
    )]
    UnknownField(StateField),
}
