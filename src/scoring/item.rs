//! Score candidates and confidence adjustment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Producer confidence in a score candidate.
///
/// Ordering is `Low < Medium < High`; conflict resolution prefers the higher
/// confidence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// One producer's score for one rubric item.
///
/// Candidates accumulate per item in
/// [`GlobalState::scores`](crate::state::GlobalState); aggregation picks a
/// winner per item and the rest feed conflict detection.
///
/// # Examples
///
/// ```rust
/// use rubriq::scoring::{Confidence, ItemScore};
///
/// let score = ItemScore::new("naming", "readability", 8.0, 10.0)
///     .with_confidence(Confidence::Medium)
///     .with_producer("style_check");
///
/// // Medium confidence discounts the raw score by 15%.
/// assert!((score.adjusted() - 6.8).abs() < 1e-9);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemScore {
    /// Rubric item id this candidate scores.
    pub item: String,
    /// Category the item rolls up into.
    pub category: String,
    /// Raw score as reported by the producer.
    pub raw: f64,
    /// Maximum attainable score for the item.
    pub max: f64,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// Node id that produced this candidate.
    pub producer: String,
    pub recorded_at: DateTime<Utc>,
}

impl ItemScore {
    pub fn new(
        item: impl Into<String>,
        category: impl Into<String>,
        raw: f64,
        max: f64,
    ) -> Self {
        Self {
            item: item.into(),
            category: category.into(),
            raw,
            max,
            confidence: Confidence::High,
            rationale: None,
            producer: String::new(),
            recorded_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    #[must_use]
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    #[must_use]
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = producer.into();
        self
    }

    #[must_use]
    pub fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }

    /// Confidence-adjusted score, clamped to `[0, max]`.
    ///
    /// - `High` keeps the raw score.
    /// - `Medium` discounts it to `raw * 0.85`.
    /// - `Low` blends toward the midpoint: `0.3 * raw + 0.7 * (max * 0.5)`.
    pub fn adjusted(&self) -> f64 {
        let adjusted = match self.confidence {
            Confidence::High => self.raw,
            Confidence::Medium => self.raw * 0.85,
            Confidence::Low => 0.3 * self.raw + 0.7 * (self.max * 0.5),
        };
        adjusted.clamp(0.0, self.max)
    }

    /// Total-order comparison used for conflict resolution.
    ///
    /// Higher confidence wins, then the later timestamp, then the
    /// lexicographically greater producer id. The producer tie-break exists
    /// purely to make merges order-independent.
    pub fn cmp_preference(&self, other: &Self) -> Ordering {
        self.confidence
            .cmp(&other.confidence)
            .then_with(|| self.recorded_at.cmp(&other.recorded_at))
            .then_with(|| self.producer.cmp(&other.producer))
    }
}
