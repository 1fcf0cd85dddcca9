//! Score aggregation and the quality gate.
//!
//! Analysis nodes emit [`ItemScore`] candidates against a fixed [`Rubric`].
//! Aggregation resolves one winner per item (higher confidence, then later
//! timestamp, then producer id), flags conflicting producers, rolls scores
//! up per category, and the [`GateThresholds`] turn the normalized result
//! into a [`Verdict`].
//!
//! # Examples
//!
//! ```
//! use rubriq::scoring::{aggregate, GateThresholds, ItemScore, Rubric, Verdict};
//! use rustc_hash::FxHashMap;
//!
//! let rubric = Rubric::new()
//!     .item("naming", "readability", 10.0)
//!     .item("layout", "readability", 10.0);
//!
//! let mut scores: FxHashMap<String, Vec<ItemScore>> = FxHashMap::default();
//! scores.insert(
//!     "naming".to_string(),
//!     vec![ItemScore::new("naming", "readability", 9.0, 10.0).with_producer("lint")],
//! );
//! scores.insert(
//!     "layout".to_string(),
//!     vec![ItemScore::new("layout", "readability", 8.0, 10.0).with_producer("lint")],
//! );
//!
//! let summary = aggregate(&rubric, &scores, 2.0);
//! assert_eq!(summary.evaluated, 2);
//! assert_eq!(GateThresholds::default().evaluate(&summary), Verdict::Pass);
//! ```

mod aggregate;
mod gate;
mod item;

pub use aggregate::{
    aggregate, CategoryRollup, ConflictNote, Rubric, RubricItem, ScoreSummary,
    DEFAULT_CONFLICT_RANGE,
};
pub use gate::{GateThresholds, Verdict};
pub use item::{Confidence, ItemScore};
