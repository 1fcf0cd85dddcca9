//! Constructors for the hash-map shapes the engine passes around.
//!
//! The state and node-result types use `FxHashMap` throughout; these helpers
//! keep call sites from spelling out the hasher.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::scoring::ItemScore;

/// Empty diagnostics map, ready for [`crate::node::NodeResult::with_diagnostics`].
///
/// # Examples
///
/// ```rust
/// use rubriq::utils::collections::new_diag_map;
/// use serde_json::json;
///
/// let mut diag = new_diag_map();
/// diag.insert("lint".to_string(), json!({"warnings": 3}));
/// ```
#[must_use]
pub fn new_diag_map() -> FxHashMap<String, Value> {
    FxHashMap::default()
}

/// Empty score-candidate map keyed by rubric item id.
#[must_use]
pub fn new_scores_map() -> FxHashMap<String, Vec<ItemScore>> {
    FxHashMap::default()
}

/// Diagnostics map pre-sized for a known number of entries.
#[must_use]
pub fn diag_map_with_capacity(capacity: usize) -> FxHashMap<String, Value> {
    FxHashMap::with_capacity_and_hasher(capacity, Default::default())
}
