//! Task node abstractions: the [`TaskNode`] trait, execution context, result
//! deltas, and fatal-error taxonomy.

use async_trait::async_trait;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::cache::ResultCache;
use crate::errors::ErrorEntry;
use crate::policy::{CredentialStore, PolicyRegistry};
use crate::progress::JobPublisher;
use crate::scoring::ItemScore;
use crate::state::StateSnapshot;
use crate::types::{JobId, NodeId};

/// An executable analysis task.
///
/// Nodes are stateless: they receive the state as it stood when they were
/// dispatched, perform their analysis, and return a [`NodeResult`] delta.
/// The engine merges deltas through the reducer registry the moment a node
/// completes.
///
/// # Error Handling
///
/// - **Fatal for this node**: return `Err(NodeError)`. The failure is
///   recorded and siblings keep running (continue-on-error).
/// - **Recoverable**: push an [`ErrorEntry`] into `NodeResult::errors` and
///   return `Ok`.
///
/// # Examples
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use rubriq::node::{NodeError, NodeResult, TaskContext, TaskNode};
/// use rubriq::scoring::{Confidence, ItemScore};
/// use rubriq::state::StateSnapshot;
///
/// struct NamingCheck;
///
/// #[async_trait]
/// impl TaskNode for NamingCheck {
///     async fn run(
///         &self,
///         snapshot: StateSnapshot,
///         ctx: TaskContext,
///     ) -> Result<NodeResult, NodeError> {
///         ctx.emit("analysis", "scanning identifiers");
///         let source = snapshot.input["source"]
///             .as_str()
///             .ok_or(NodeError::MissingInput { what: "source" })?;
///         let raw = if source.contains("tmp") { 4.0 } else { 9.0 };
///         Ok(NodeResult::new().with_score(
///             ItemScore::new("naming", "readability", raw, 10.0)
///                 .with_confidence(Confidence::Medium)
///                 .with_producer(ctx.node_id.as_str()),
///         ))
///     }
/// }
/// ```
#[async_trait]
pub trait TaskNode: Send + Sync {
    /// Execute this node against the given snapshot.
    async fn run(
        &self,
        snapshot: StateSnapshot,
        ctx: TaskContext,
    ) -> Result<NodeResult, NodeError>;
}

/// Execution context handed to each node at dispatch time.
///
/// Carries identity, the per-job event publisher, the cooperative
/// cancellation token, and the shared collaborators a node needs to make
/// governed provider calls.
#[derive(Clone)]
pub struct TaskContext {
    pub node_id: NodeId,
    pub job_id: JobId,
    /// Zero-based layer this node was scheduled into.
    pub layer: usize,
    /// Best-effort publisher for this job's subscribers.
    pub events: JobPublisher,
    /// Cancelled when the job is cancelled or its deadline expires.
    pub cancel: CancellationToken,
    /// Shared invocation policy for provider calls.
    pub policy: Arc<PolicyRegistry>,
    /// Credential resolver; credentials are never stored by the engine.
    pub credentials: Arc<dyn CredentialStore>,
    /// Shared per-task result cache, keyed by content fingerprint.
    pub cache: Arc<ResultCache>,
}

impl TaskContext {
    /// Emit a node-scoped note to the job's subscribers.
    ///
    /// Delivery is best-effort; a closed or saturated subscriber queue drops
    /// the event rather than blocking the node.
    pub fn emit(&self, scope: impl Into<String>, message: impl Into<String>) {
        self.events.note(
            self.node_id.as_str(),
            self.layer,
            scope.into(),
            message.into(),
        );
    }
}

/// Partial state delta returned by node execution.
///
/// Every field is optional; a node updates only the channels it cares about.
///
/// # Examples
///
/// ```rust
/// use rubriq::node::NodeResult;
/// use rubriq::utils::collections::new_diag_map;
/// use serde_json::json;
///
/// let mut diag = new_diag_map();
/// diag.insert("lint".to_string(), json!({"warnings": 3}));
///
/// let result = NodeResult::new()
///     .with_techniques(vec!["lint".into()])
///     .with_diagnostics(diag);
/// ```
#[derive(Clone, Debug, Default)]
pub struct NodeResult {
    /// Technique labels to append (de-duplicated by the reducer).
    pub techniques: Option<Vec<String>>,
    /// Diagnostics to shallow-merge into the state map.
    pub diagnostics: Option<FxHashMap<String, serde_json::Value>>,
    /// Score candidates keyed by rubric item id.
    pub scores: Option<FxHashMap<String, Vec<ItemScore>>>,
    /// Non-fatal errors to record.
    pub errors: Option<Vec<ErrorEntry>>,
}

impl NodeResult {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_techniques(mut self, techniques: Vec<String>) -> Self {
        self.techniques = Some(techniques);
        self
    }

    #[must_use]
    pub fn with_diagnostics(
        mut self,
        diagnostics: FxHashMap<String, serde_json::Value>,
    ) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Add one score candidate, keyed by its item id.
    #[must_use]
    pub fn with_score(mut self, score: ItemScore) -> Self {
        self.scores
            .get_or_insert_with(FxHashMap::default)
            .entry(score.item.clone())
            .or_default()
            .push(score);
        self
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<ErrorEntry>) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Fatal errors raised by node execution.
///
/// A `NodeError` fails the node, not the job; the engine records it and
/// keeps the remaining nodes running.
#[derive(Debug, Error, Diagnostic)]
pub enum NodeError {
    /// Expected input data is missing from the snapshot.
    #[error("missing expected input: {what}")]
    #[diagnostic(
        code(rubriq::node::missing_input),
        help("Check that the job input or a predecessor node supplies the required data.")
    )]
    MissingInput { what: &'static str },

    /// A governed provider call exhausted its attempts.
    #[error("provider error ({provider}): {message}")]
    #[diagnostic(code(rubriq::node::provider))]
    Provider { provider: String, message: String },

    /// JSON serialization/deserialization error.
    #[error(transparent)]
    #[diagnostic(code(rubriq::node::serde_json))]
    Serde(#[from] serde_json::Error),

    /// Input validation failed.
    #[error("validation failed: {0}")]
    #[diagnostic(
        code(rubriq::node::validation),
        help("Check input data format and required fields.")
    )]
    ValidationFailed(String),
}
