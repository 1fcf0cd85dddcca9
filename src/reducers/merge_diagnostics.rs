use super::Reducer;
use crate::{node::NodeResult, state::GlobalState};

/// Shallow-map-union reducer for diagnostics.
///
/// The incoming delta wins on key collision. Producers namespace their keys
/// by node id, so collisions only happen when one producer overwrites its own
/// earlier entry and merge order stays immaterial.
#[derive(Debug, PartialEq, Clone, Hash, Eq)]
pub struct MergeDiagnostics;

impl Reducer for MergeDiagnostics {
    fn apply(&self, state: &mut GlobalState, update: &NodeResult) {
        if let Some(diagnostics) = &update.diagnostics
            && !diagnostics.is_empty()
        {
            for (k, v) in diagnostics.iter() {
                state.diagnostics.insert(k.clone(), v.clone());
            }
        }
    }
}
