//! Quality-gate thresholds and verdicts.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ScoreSummary;

/// Final quality verdict for a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Concerns,
    Fail,
    /// Coverage fell below the threshold; the score is not trustworthy.
    Incomplete,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pass => "pass",
            Self::Concerns => "concerns",
            Self::Fail => "fail",
            Self::Incomplete => "incomplete",
        };
        write!(f, "{label}")
    }
}

/// Named thresholds for the quality gate.
///
/// Coverage is checked first: anything below `coverage` is
/// [`Verdict::Incomplete`] regardless of the normalized score. Otherwise the
/// normalized score maps to Pass / Concerns / Fail.
///
/// # Examples
///
/// ```
/// use rubriq::scoring::GateThresholds;
///
/// let strict = GateThresholds::default()
///     .with_pass(85.0)
///     .with_coverage(0.9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateThresholds {
    /// Normalized score at or above which the verdict is Pass.
    pub pass: f64,
    /// Normalized score at or above which the verdict is Concerns.
    pub concerns: f64,
    /// Minimum coverage for any verdict other than Incomplete.
    pub coverage: f64,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            pass: 70.0,
            concerns: 50.0,
            coverage: 0.5,
        }
    }
}

impl GateThresholds {
    #[must_use]
    pub fn with_pass(mut self, pass: f64) -> Self {
        self.pass = pass;
        self
    }

    #[must_use]
    pub fn with_concerns(mut self, concerns: f64) -> Self {
        self.concerns = concerns;
        self
    }

    #[must_use]
    pub fn with_coverage(mut self, coverage: f64) -> Self {
        self.coverage = coverage;
        self
    }

    /// Map an aggregated summary to its verdict.
    pub fn evaluate(&self, summary: &ScoreSummary) -> Verdict {
        if summary.coverage < self.coverage {
            return Verdict::Incomplete;
        }
        if summary.normalized >= self.pass {
            Verdict::Pass
        } else if summary.normalized >= self.concerns {
            Verdict::Concerns
        } else {
            Verdict::Fail
        }
    }
}
