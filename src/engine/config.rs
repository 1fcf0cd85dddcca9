use std::time::Duration;

use crate::progress::DEFAULT_EVENT_CAPACITY;
use crate::scoring::{GateThresholds, Rubric, DEFAULT_CONFLICT_RANGE};
use crate::types::NodeId;

/// Engine-wide tuning knobs.
///
/// # Examples
///
/// ```rust
/// use rubriq::engine::EngineConfig;
/// use rubriq::scoring::Rubric;
/// use std::time::Duration;
///
/// let config = EngineConfig::default()
///     .with_max_parallelism(8)
///     .with_job_deadline(Duration::from_secs(300))
///     .with_rubric(Rubric::new().item("naming", "readability", 10.0));
/// ```
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Upper bound on concurrently running nodes within a layer.
    pub max_parallelism: usize,
    /// Wall-clock budget for a whole job; `None` disables the deadline.
    pub job_deadline: Option<Duration>,
    /// Node whose failure fails the whole job rather than degrading it.
    pub finalize_node: Option<NodeId>,
    /// Verdict thresholds applied to the aggregated score.
    pub gate: GateThresholds,
    /// Raw-score spread beyond which disagreeing producers get a conflict note.
    pub conflict_range: f64,
    /// Rubric the job is scored against.
    pub rubric: Rubric,
    /// Per-subscriber event queue depth.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_parallelism: 4,
            job_deadline: None,
            finalize_node: None,
            gate: GateThresholds::default(),
            conflict_range: DEFAULT_CONFLICT_RANGE,
            rubric: Rubric::new(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.max_parallelism = max_parallelism.max(1);
        self
    }

    #[must_use]
    pub fn with_job_deadline(mut self, deadline: Duration) -> Self {
        self.job_deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_finalize_node(mut self, node: impl Into<NodeId>) -> Self {
        self.finalize_node = Some(node.into());
        self
    }

    #[must_use]
    pub fn with_gate(mut self, gate: GateThresholds) -> Self {
        self.gate = gate;
        self
    }

    #[must_use]
    pub fn with_conflict_range(mut self, range: f64) -> Self {
        self.conflict_range = range;
        self
    }

    #[must_use]
    pub fn with_rubric(mut self, rubric: Rubric) -> Self {
        self.rubric = rubric;
        self
    }

    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}
