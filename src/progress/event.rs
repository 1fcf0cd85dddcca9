use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::progress::tracker::ProgressSnapshot;
use crate::types::{JobStatus, NodeId};

/// A single observation emitted while a job runs.
///
/// Events carry their emission time and enough structure for a consumer to
/// render a live view or an audit trail without parsing message text.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobEvent {
    NodeStarted {
        when: DateTime<Utc>,
        node: NodeId,
        layer: usize,
    },
    NodeCompleted {
        when: DateTime<Utc>,
        node: NodeId,
        layer: usize,
    },
    NodeFailed {
        when: DateTime<Utc>,
        node: NodeId,
        layer: usize,
        message: String,
    },
    NodeSkipped {
        when: DateTime<Utc>,
        node: NodeId,
        layer: usize,
    },
    /// Free-form note from inside a running node.
    Note {
        when: DateTime<Utc>,
        node: NodeId,
        layer: usize,
        scope: String,
        message: String,
    },
    /// Periodic counter snapshot.
    Progress {
        when: DateTime<Utc>,
        snapshot: ProgressSnapshot,
    },
    /// Terminal event; no further events follow for the job.
    Closed {
        when: DateTime<Utc>,
        status: JobStatus,
    },
}

impl JobEvent {
    pub fn node_started(node: NodeId, layer: usize) -> Self {
        Self::NodeStarted {
            when: Utc::now(),
            node,
            layer,
        }
    }

    pub fn node_completed(node: NodeId, layer: usize) -> Self {
        Self::NodeCompleted {
            when: Utc::now(),
            node,
            layer,
        }
    }

    pub fn node_failed(node: NodeId, layer: usize, message: impl Into<String>) -> Self {
        Self::NodeFailed {
            when: Utc::now(),
            node,
            layer,
            message: message.into(),
        }
    }

    pub fn node_skipped(node: NodeId, layer: usize) -> Self {
        Self::NodeSkipped {
            when: Utc::now(),
            node,
            layer,
        }
    }

    pub fn note(
        node: NodeId,
        layer: usize,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Note {
            when: Utc::now(),
            node,
            layer,
            scope: scope.into(),
            message: message.into(),
        }
    }

    pub fn progress(snapshot: ProgressSnapshot) -> Self {
        Self::Progress {
            when: Utc::now(),
            snapshot,
        }
    }

    pub fn closed(status: JobStatus) -> Self {
        Self::Closed {
            when: Utc::now(),
            status,
        }
    }

    pub fn when(&self) -> DateTime<Utc> {
        match self {
            Self::NodeStarted { when, .. }
            | Self::NodeCompleted { when, .. }
            | Self::NodeFailed { when, .. }
            | Self::NodeSkipped { when, .. }
            | Self::Note { when, .. }
            | Self::Progress { when, .. }
            | Self::Closed { when, .. } => *when,
        }
    }

    /// Short label for log lines and display grouping.
    #[must_use]
    pub fn scope_label(&self) -> &str {
        match self {
            Self::NodeStarted { .. } => "node:started",
            Self::NodeCompleted { .. } => "node:completed",
            Self::NodeFailed { .. } => "node:failed",
            Self::NodeSkipped { .. } => "node:skipped",
            Self::Note { scope, .. } => scope.as_str(),
            Self::Progress { .. } => "progress",
            Self::Closed { .. } => "closed",
        }
    }

    /// Human-readable body, without the timestamp or scope.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NodeStarted { node, layer, .. } => {
                format!("{node} started in layer {layer}")
            }
            Self::NodeCompleted { node, layer, .. } => {
                format!("{node} completed in layer {layer}")
            }
            Self::NodeFailed {
                node,
                layer,
                message,
                ..
            } => format!("{node} failed in layer {layer}: {message}"),
            Self::NodeSkipped { node, layer, .. } => {
                format!("{node} skipped in layer {layer}")
            }
            Self::Note { node, message, .. } => format!("{node}: {message}"),
            Self::Progress { snapshot, .. } => format!(
                "{}/{} done, {} failed, {} in flight",
                snapshot.completed, snapshot.total, snapshot.failed, snapshot.in_flight
            ),
            Self::Closed { status, .. } => format!("job {status}"),
        }
    }

    /// Whole event as JSON, for sinks that want structured output.
    pub fn to_json_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl fmt::Display for JobEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.when().format("%H:%M:%S%.3f"),
            self.scope_label(),
            self.message()
        )
    }
}
