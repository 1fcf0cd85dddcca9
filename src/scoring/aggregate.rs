//! Rubric definition, per-item conflict resolution, and category rollups.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ItemScore;

/// Raw-score spread above which multiple producers on one item are flagged.
pub const DEFAULT_CONFLICT_RANGE: f64 = 2.0;

/// One scoreable item in the rubric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RubricItem {
    pub id: String,
    pub category: String,
    pub max: f64,
}

/// The fixed set of items a job is scored against.
///
/// Items start out data-missing; only items with at least one candidate
/// count as evaluated. Coverage is `evaluated / total`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    items: Vec<RubricItem>,
}

impl Rubric {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one item; fluent.
    #[must_use]
    pub fn item(
        mut self,
        id: impl Into<String>,
        category: impl Into<String>,
        max: f64,
    ) -> Self {
        self.items.push(RubricItem {
            id: id.into(),
            category: category.into(),
            max,
        });
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[RubricItem] {
        &self.items
    }
}

/// Non-fatal note recording disagreement between producers on one item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConflictNote {
    pub item: String,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub producers: Vec<String>,
}

/// Per-category score totals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryRollup {
    pub category: String,
    /// Sum of confidence-adjusted winning scores for evaluated items.
    pub score: f64,
    /// Sum of maxima for evaluated items.
    pub max: f64,
    pub evaluated: usize,
    pub total: usize,
}

/// The aggregated result of resolving all candidates against a rubric.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub rollups: Vec<CategoryRollup>,
    pub conflicts: Vec<ConflictNote>,
    /// `evaluated / total`; 0.0 for an empty rubric.
    pub coverage: f64,
    /// `100 * Σ adjusted / Σ max` over evaluated items; 0.0 when nothing
    /// was evaluated.
    pub normalized: f64,
    pub evaluated: usize,
    pub total: usize,
}

/// Resolve candidates against the rubric.
///
/// For every rubric item with candidates, the winner is the candidate with
/// the highest confidence, breaking ties by later timestamp and then by
/// producer id. Items where at least two producers disagree by more than
/// `conflict_range` raw points get a [`ConflictNote`]. Rollups are sorted
/// by category name for reproducible output.
pub fn aggregate(
    rubric: &Rubric,
    scores: &FxHashMap<String, Vec<ItemScore>>,
    conflict_range: f64,
) -> ScoreSummary {
    let mut by_category: FxHashMap<&str, CategoryRollup> = FxHashMap::default();
    let mut conflicts: Vec<ConflictNote> = Vec::new();
    let mut evaluated = 0usize;
    let mut score_sum = 0.0f64;
    let mut max_sum = 0.0f64;

    for unknown in scores
        .keys()
        .filter(|id| !rubric.items().iter().any(|item| &item.id == *id))
    {
        warn!(item = %unknown, "dropping score candidates for item not in the rubric");
    }

    for item in rubric.items() {
        let rollup = by_category
            .entry(item.category.as_str())
            .or_insert_with(|| CategoryRollup {
                category: item.category.clone(),
                score: 0.0,
                max: 0.0,
                evaluated: 0,
                total: 0,
            });
        rollup.total += 1;

        let Some(candidates) = scores.get(&item.id).filter(|c| !c.is_empty()) else {
            debug!(item = %item.id, "rubric item has no candidates");
            continue;
        };

        let winner = candidates
            .iter()
            .max_by(|a, b| a.cmp_preference(b))
            .cloned()
            .unwrap_or_else(|| candidates[0].clone());

        if candidates.len() >= 2 {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for c in candidates {
                lo = lo.min(c.raw);
                hi = hi.max(c.raw);
            }
            let range = hi - lo;
            if range > conflict_range {
                let mut producers: Vec<String> =
                    candidates.iter().map(|c| c.producer.clone()).collect();
                producers.sort();
                conflicts.push(ConflictNote {
                    item: item.id.clone(),
                    min: lo,
                    max: hi,
                    range,
                    producers,
                });
            }
        }

        let adjusted = winner.adjusted().clamp(0.0, item.max);
        evaluated += 1;
        score_sum += adjusted;
        max_sum += item.max;
        rollup.evaluated += 1;
        rollup.score += adjusted;
        rollup.max += item.max;
    }

    let total = rubric.len();
    let coverage = if total == 0 {
        0.0
    } else {
        evaluated as f64 / total as f64
    };
    let normalized = if max_sum > 0.0 {
        100.0 * score_sum / max_sum
    } else {
        0.0
    };

    let mut rollups: Vec<CategoryRollup> = by_category.into_values().collect();
    rollups.sort_by(|a, b| a.category.cmp(&b.category));
    conflicts.sort_by(|a, b| a.item.cmp(&b.item));

    ScoreSummary {
        rollups,
        conflicts,
        coverage,
        normalized,
        evaluated,
        total,
    }
}
