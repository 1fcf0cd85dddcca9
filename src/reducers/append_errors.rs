use chrono::{DateTime, Utc};

use super::Reducer;
use crate::errors::ErrorEntry;
use crate::{node::NodeResult, state::GlobalState};

/// Append reducer for error entries.
///
/// The merged list is kept sorted by timestamp, breaking ties by the entry's
/// serialized form, and exact duplicates are dropped. Any merge order
/// therefore produces the same list.
#[derive(Debug, PartialEq, Clone, Hash, Eq)]
pub struct AppendErrors;

fn entry_key(entry: &ErrorEntry) -> (DateTime<Utc>, String) {
    (
        entry.when,
        serde_json::to_string(entry).unwrap_or_default(),
    )
}

impl Reducer for AppendErrors {
    fn apply(&self, state: &mut GlobalState, update: &NodeResult) {
        if let Some(errors) = &update.errors
            && !errors.is_empty()
        {
            state.errors.extend(errors.iter().cloned());
            state.errors.sort_by_cached_key(entry_key);
            state.errors.dedup();
        }
    }
}
