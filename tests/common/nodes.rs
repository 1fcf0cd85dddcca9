#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;

use rubriq::node::{NodeError, NodeResult, TaskContext, TaskNode};
use rubriq::scoring::{Confidence, ItemScore};
use rubriq::state::StateSnapshot;
use rubriq::utils::collections::new_diag_map;

/// Appends `ran:<name>` to the technique list.
#[derive(Debug, Clone)]
pub struct TechniqueNode {
    pub name: &'static str,
}

impl TechniqueNode {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl TaskNode for TechniqueNode {
    async fn run(
        &self,
        _snapshot: StateSnapshot,
        _ctx: TaskContext,
    ) -> Result<NodeResult, NodeError> {
        Ok(NodeResult::new().with_techniques(vec![format!("ran:{}", self.name)]))
    }
}

/// Emits one score candidate, attributed to the node's own id.
#[derive(Debug, Clone)]
pub struct ScoreNode {
    pub item: &'static str,
    pub category: &'static str,
    pub raw: f64,
    pub max: f64,
    pub confidence: Confidence,
}

impl ScoreNode {
    pub fn new(item: &'static str, category: &'static str, raw: f64, max: f64) -> Self {
        Self {
            item,
            category,
            raw,
            max,
            confidence: Confidence::High,
        }
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }
}

#[async_trait]
impl TaskNode for ScoreNode {
    async fn run(
        &self,
        _snapshot: StateSnapshot,
        ctx: TaskContext,
    ) -> Result<NodeResult, NodeError> {
        Ok(NodeResult::new().with_score(
            ItemScore::new(self.item, self.category, self.raw, self.max)
                .with_confidence(self.confidence)
                .with_producer(ctx.node_id.as_str()),
        ))
    }
}

/// Records what it saw in the snapshot as a diagnostic, namespaced by node id.
#[derive(Debug, Clone)]
pub struct InspectNode;

#[async_trait]
impl TaskNode for InspectNode {
    async fn run(
        &self,
        snapshot: StateSnapshot,
        ctx: TaskContext,
    ) -> Result<NodeResult, NodeError> {
        let mut diag = new_diag_map();
        diag.insert(
            ctx.node_id.to_string(),
            json!({"techniques_seen": snapshot.techniques}),
        );
        Ok(NodeResult::new().with_diagnostics(diag))
    }
}

/// Always fails with a validation error.
#[derive(Debug, Clone)]
pub struct FailingNode;

#[async_trait]
impl TaskNode for FailingNode {
    async fn run(
        &self,
        _snapshot: StateSnapshot,
        _ctx: TaskContext,
    ) -> Result<NodeResult, NodeError> {
        Err(NodeError::ValidationFailed("fixture failure".into()))
    }
}

/// Blocks until the job is cancelled, then returns an empty delta.
#[derive(Debug, Clone)]
pub struct AwaitCancelNode;

#[async_trait]
impl TaskNode for AwaitCancelNode {
    async fn run(
        &self,
        _snapshot: StateSnapshot,
        ctx: TaskContext,
    ) -> Result<NodeResult, NodeError> {
        ctx.cancel.cancelled().await;
        Ok(NodeResult::new())
    }
}

/// Sleeps for a fixed duration before returning a technique.
#[derive(Debug, Clone)]
pub struct SlowNode {
    pub name: &'static str,
    pub delay_ms: u64,
}

#[async_trait]
impl TaskNode for SlowNode {
    async fn run(
        &self,
        _snapshot: StateSnapshot,
        _ctx: TaskContext,
    ) -> Result<NodeResult, NodeError> {
        tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        Ok(NodeResult::new().with_techniques(vec![format!("ran:{}", self.name)]))
    }
}
