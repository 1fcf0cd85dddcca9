#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use rubriq::cache::ResultCache;
use rubriq::node::TaskContext;
use rubriq::policy::{PolicyRegistry, StaticCredentialStore};
use rubriq::progress::{EventHub, JobEvent, JobPublisher};
use rubriq::scoring::Rubric;
use rubriq::state::{GlobalState, StateSnapshot};
use rubriq::types::JobId;

pub fn empty_snapshot() -> StateSnapshot {
    GlobalState::builder().build().snapshot()
}

pub fn snapshot_with_input(input: Value) -> StateSnapshot {
    GlobalState::new_with_input(input).snapshot()
}

pub fn review_input() -> Value {
    json!({"source": "fn main() { let total = compute(); }"})
}

/// Three-item rubric used by most engine tests: 25 raw points across two
/// categories.
pub fn review_rubric() -> Rubric {
    Rubric::new()
        .item("naming", "readability", 10.0)
        .item("structure", "design", 10.0)
        .item("tests", "design", 5.0)
}

/// A standalone context for exercising a node outside the engine, plus the
/// receiver its emitted events land on.
pub fn test_context(node: &str, layer: usize) -> (TaskContext, flume::Receiver<JobEvent>) {
    let hub = Arc::new(EventHub::default());
    let job_id = JobId::new();
    let rx = hub.subscribe(job_id);
    let ctx = TaskContext {
        node_id: node.into(),
        job_id,
        layer,
        events: JobPublisher::new(hub, job_id),
        cancel: CancellationToken::new(),
        policy: Arc::new(PolicyRegistry::default()),
        credentials: Arc::new(StaticCredentialStore::new()),
        cache: Arc::new(ResultCache::default()),
    };
    (ctx, rx)
}

pub fn assert_has_technique(state: &GlobalState, needle: &str) {
    assert!(
        state.techniques.iter().any(|t| t == needle),
        "expected technique '{needle}', got: {:?}",
        state.techniques
    );
}
