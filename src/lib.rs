//! # Rubriq: Concurrent DAG Analysis Engine
//!
//! Rubriq runs analysis tasks arranged as a directed acyclic graph. The
//! graph compiles into dependency layers; nodes within a layer execute
//! concurrently, each returning a partial state delta that deterministic
//! reducers fold into the shared job state the moment the node completes.
//! One failing node degrades the job, it never aborts siblings.
//!
//! ## Core Concepts
//!
//! - **Nodes**: Async analysis tasks that read a state snapshot and return
//!   a [`node::NodeResult`] delta
//! - **Graph**: Declarative dependency definition compiled into a layered
//!   [`graph::ExecutionPlan`]
//! - **Reducers**: Commutative merge strategies per state field, so merge
//!   order within a layer never changes the outcome
//! - **Policy**: Governed provider invocations with concurrency caps, rate
//!   pacing, timeouts, and classified retry
//! - **Scoring**: Confidence-adjusted rubric aggregation behind a quality
//!   gate that issues a [`scoring::Verdict`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use rubriq::engine::{Engine, EngineConfig, NodeRegistry};
//! use rubriq::graph::GraphBuilder;
//! use rubriq::node::{NodeError, NodeResult, TaskContext, TaskNode};
//! use rubriq::scoring::{Confidence, ItemScore, Rubric};
//! use rubriq::state::StateSnapshot;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct NamingCheck;
//!
//! #[async_trait]
//! impl TaskNode for NamingCheck {
//!     async fn run(
//!         &self,
//!         snapshot: StateSnapshot,
//!         ctx: TaskContext,
//!     ) -> Result<NodeResult, NodeError> {
//!         let source = snapshot.input["source"]
//!             .as_str()
//!             .ok_or(NodeError::MissingInput { what: "source" })?;
//!         let raw = if source.contains("tmp") { 4.0 } else { 9.0 };
//!         Ok(NodeResult::new().with_score(
//!             ItemScore::new("naming", "readability", raw, 10.0)
//!                 .with_confidence(Confidence::Medium)
//!                 .with_producer(ctx.node_id.as_str()),
//!         ))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default()
//!         .with_rubric(Rubric::new().item("naming", "readability", 10.0));
//!     let registry = NodeRegistry::new().bind("naming", Arc::new(NamingCheck));
//!     let engine = Engine::new(config, registry);
//!
//!     let graph = GraphBuilder::new().define("naming", Vec::<&str>::new());
//!     let job = engine.submit(graph, json!({"source": "fn main() {}"}))?;
//!
//!     let events = engine.subscribe(job)?;
//!     while let Ok(event) = events.recv_async().await {
//!         println!("{event}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Guide
//!
//! - [`graph`] - Dependency definition, validation, and layered planning
//! - [`node`] - The task trait, execution context, and result deltas
//! - [`state`] - Shared job state and dispatch-time snapshots
//! - [`reducers`] - Deterministic per-field merge strategies
//! - [`engine`] - Job submission, execution, and persistence
//! - [`policy`] - Provider invocation governance and credentials
//! - [`cache`] - Content-addressed per-task result cache
//! - [`scoring`] - Rubric aggregation and the quality gate
//! - [`progress`] - Counters and per-job event fan-out

pub mod cache;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod node;
pub mod policy;
pub mod progress;
pub mod reducers;
pub mod scoring;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod utils;
