//! Core identifier and status types for the rubriq analysis engine.
//!
//! This module defines the fundamental domain vocabulary used throughout the
//! crate: node identifiers, job identifiers, and the two state machines that
//! govern execution.
//!
//! # Key Types
//!
//! - [`NodeId`]: Identifies an analysis task within an execution plan
//! - [`JobId`]: Identifies one submitted job
//! - [`NodeStatus`] / [`JobStatus`]: The per-node and per-job state machines
//!
//! # Examples
//!
//! ```rust
//! use rubriq::types::{NodeId, JobStatus};
//!
//! let node: NodeId = "style_check".into();
//! assert_eq!(node.as_str(), "style_check");
//!
//! assert!(JobStatus::PartiallyFailed.is_terminal());
//! assert!(!JobStatus::Running.is_terminal());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier for an analysis task node within an execution plan.
///
/// Node ids are plain strings chosen by the graph author. They must be unique
/// within one graph definition; ordering (used for deterministic layering and
/// logs) is lexicographic.
///
/// # Examples
///
/// ```rust
/// use rubriq::types::NodeId;
///
/// let a = NodeId::new("alpha");
/// let b: NodeId = "beta".into();
/// assert!(a < b);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the id and return the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier for one submitted job.
///
/// Job ids are random v4 UUIDs minted at submission time and returned to the
/// caller immediately; all later interactions (result, subscribe, cancel) key
/// on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a single node within a running job.
///
/// Transitions: `Pending → Running → {Completed, Failed}`, or
/// `Pending → Skipped` when the job is cancelled before the node is
/// dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl NodeStatus {
    /// Returns `true` once the node will make no further progress.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        };
        write!(f, "{label}")
    }
}

/// Lifecycle of a submitted job.
///
/// Transitions: `Pending → Running → {Completed, PartiallyFailed, Failed,
/// Cancelled}`.
///
/// - `Completed`: every node completed.
/// - `PartiallyFailed`: at least one node failed but the job finished.
/// - `Failed`: the designated finalize node failed, or the job deadline
///   expired.
/// - `Cancelled`: the caller cancelled the job; results merged before the
///   cancellation are retained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    PartiallyFailed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Returns `true` once the job will make no further progress.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::PartiallyFailed | Self::Failed | Self::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::PartiallyFailed => "partially_failed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}
