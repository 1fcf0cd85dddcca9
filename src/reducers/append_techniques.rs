use super::Reducer;
use crate::{node::NodeResult, state::GlobalState};

/// Append-unique-sorted reducer for the technique list.
///
/// The list is re-sorted and de-duplicated on every apply, so the final
/// contents are independent of merge order.
#[derive(Debug, PartialEq, Clone, Hash, Eq)]
pub struct AppendTechniques;

impl Reducer for AppendTechniques {
    fn apply(&self, state: &mut GlobalState, update: &NodeResult) {
        if let Some(techniques) = &update.techniques
            && !techniques.is_empty()
        {
            state.techniques.extend(techniques.iter().cloned());
            state.techniques.sort();
            state.techniques.dedup();
        }
    }
}
