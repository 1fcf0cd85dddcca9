use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::instrument;

use crate::{
    node::NodeResult,
    reducers::{
        AppendErrors, AppendTechniques, MergeDiagnostics, MergeScores, Reducer, ReducerError,
        StateField,
    },
    state::GlobalState,
};

/// Registry binding one reducer chain to each mutable state field.
///
/// Constructed once per engine and shared by reference; the default wiring
/// covers all four fields.
#[derive(Clone)]
pub struct ReducerRegistry {
    reducer_map: FxHashMap<StateField, Vec<Arc<dyn Reducer>>>,
}

/// Checks whether a NodeResult carries meaningful data for the given field,
/// letting the registry skip reducers with nothing to do.
fn field_guard(field: &StateField, result: &NodeResult) -> bool {
    match field {
        StateField::Techniques => result
            .techniques
            .as_ref()
            .map(|v| !v.is_empty())
            .unwrap_or(false),
        StateField::Diagnostics => result
            .diagnostics
            .as_ref()
            .map(|m| !m.is_empty())
            .unwrap_or(false),
        StateField::Scores => result
            .scores
            .as_ref()
            .map(|m| !m.is_empty())
            .unwrap_or(false),
        StateField::Errors => result
            .errors
            .as_ref()
            .map(|v| !v.is_empty())
            .unwrap_or(false),
    }
}

impl Default for ReducerRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry
            .register(StateField::Techniques, Arc::new(AppendTechniques))
            .register(StateField::Diagnostics, Arc::new(MergeDiagnostics))
            .register(StateField::Scores, Arc::new(MergeScores))
            .register(StateField::Errors, Arc::new(AppendErrors));
        registry
    }
}

impl ReducerRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            reducer_map: FxHashMap::default(),
        }
    }

    /// Registers a reducer for a field.
    ///
    /// Multiple reducers may be registered for the same field and run in
    /// registration order.
    pub fn register(&mut self, field: StateField, reducer: Arc<dyn Reducer>) -> &mut Self {
        self.reducer_map.entry(field).or_default().push(reducer);
        self
    }

    /// Builder-style registration for fluent construction.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use rubriq::reducers::{AppendTechniques, ReducerRegistry, StateField};
    ///
    /// let registry = ReducerRegistry::new()
    ///     .with_reducer(StateField::Techniques, Arc::new(AppendTechniques));
    /// ```
    #[must_use]
    pub fn with_reducer(mut self, field: StateField, reducer: Arc<dyn Reducer>) -> Self {
        self.register(field, reducer);
        self
    }

    #[instrument(skip(self, state, update), err)]
    pub fn try_update(
        &self,
        field: StateField,
        state: &mut GlobalState,
        update: &NodeResult,
    ) -> Result<(), ReducerError> {
        // Skip if the result has no applicable data for this field.
        if !field_guard(&field, update) {
            return Ok(());
        }

        if let Some(reducers) = self.reducer_map.get(&field) {
            for reducer in reducers {
                reducer.apply(state, update);
            }
            Ok(())
        } else {
            Err(ReducerError::UnknownField(field))
        }
    }

    /// Fold one node's delta into the state across every registered field.
    #[instrument(skip(self, state, update), err)]
    pub fn apply_all(
        &self,
        state: &mut GlobalState,
        update: &NodeResult,
    ) -> Result<(), ReducerError> {
        for field in self.reducer_map.keys() {
            self.try_update(*field, state, update)?;
        }
        Ok(())
    }
}
